use super::model::{JobiphBlock, RootMapping};
use std::collections::BTreeMap;

// Marker phrases are a fixed contract of the RASSI output format.
const JOBIPH_START_MARKER: &str = "Specific data for JOBIPH file";
const JOBIPH_END_MARKER: &str = "NR OF CONFIG";
const JOBIPH_LABEL_SPLIT: &str = "JOBIPH file";
const IRREP_TAG: &str = "STATE IRREP:";
const MULTIPLICITY_TAG: &str = "SPIN MULTIPLICITY:";
const STATE_NR_TAG: &str = "STATE NR:";
const STATE_LIST_TAG: &str = "States included from this file:";
const MAPPING_HEADER: &str = "State:";
const ENERGY_STATE_MARKER: &str = "RASSI State";
const ENERGY_VALUE_MARKER: &str = "Total energy:";
const ABSM_STATE_HEADER: &str = "SF State";
const ABSM_VALUE_HEADER: &str = "Abs_M";

/// A mapping group carries at most 20 states per three-line block.
const MAPPING_GROUP_WIDTH: usize = 20;
const ABSM_MIN_TOKENS: usize = 6;
const ABSM_VALUE_COLUMN: usize = 5;

/// Collects `Specific data for JOBIPH file ...` metadata sections.
///
/// A start marker while a block is still open closes and emits the open
/// block; the marker's own block is dropped. End-of-file flushes whatever
/// is open.
#[derive(Debug, Default)]
pub(super) struct JobiphScanner {
    open: Option<JobiphBlock>,
    expect_state_list: bool,
    blocks: Vec<JobiphBlock>,
}

impl JobiphScanner {
    pub(super) fn offer(&mut self, line: &str) {
        let trimmed = line.trim();

        if self.expect_state_list {
            self.expect_state_list = false;
            if let Some(block) = self.open.as_mut() {
                let states: Vec<u32> = trimmed
                    .split_whitespace()
                    .filter_map(|token| token.parse().ok())
                    .collect();
                if !states.is_empty() {
                    block.states = states;
                }
            }
        }

        if trimmed.starts_with(JOBIPH_START_MARKER) {
            if let Some(block) = self.open.take() {
                self.blocks.push(block);
                return;
            }
            let label = trimmed
                .rsplit(JOBIPH_LABEL_SPLIT)
                .next()
                .unwrap_or("")
                .trim();
            self.open = Some(JobiphBlock::new(label));
            return;
        }

        if trimmed.contains(JOBIPH_END_MARKER) {
            if let Some(block) = self.open.take() {
                self.blocks.push(block);
            }
            return;
        }

        if let Some(block) = self.open.as_mut() {
            if trimmed.contains(IRREP_TAG) {
                block.irrep = last_token_i32(trimmed);
            } else if trimmed.contains(MULTIPLICITY_TAG) {
                block.multiplicity = last_token_i32(trimmed);
            } else if trimmed.contains(STATE_NR_TAG) {
                if let Some(state) = last_token_u32(trimmed) {
                    block.states.push(state);
                }
            } else if trimmed.contains(STATE_LIST_TAG) {
                self.expect_state_list = true;
            }
        }
    }

    pub(super) fn finish(mut self) -> Vec<JobiphBlock> {
        if let Some(block) = self.open.take() {
            self.blocks.push(block);
        }
        self.blocks
    }
}

/// Collects three-line `State:` / selector / root groups into per-state
/// mapping lists.
///
/// The three integer windows must agree in length; a group whose lines
/// disagree, or whose window tokens fail integer parsing, is rejected
/// whole rather than truncated to the shortest line.
#[derive(Debug, Default)]
pub(super) struct MappingScanner {
    pending: Option<PendingMappingGroup>,
    mappings: BTreeMap<u32, Vec<RootMapping>>,
}

#[derive(Debug)]
struct PendingMappingGroup {
    states: Vec<u32>,
    selectors: Option<Vec<u32>>,
}

impl MappingScanner {
    pub(super) fn offer(&mut self, line: &str) {
        match self.pending.take() {
            Some(PendingMappingGroup {
                states,
                selectors: None,
            }) => {
                if let Some(selectors) = integer_window(line, 1, MAPPING_GROUP_WIDTH) {
                    self.pending = Some(PendingMappingGroup {
                        states,
                        selectors: Some(selectors),
                    });
                }
            }
            Some(PendingMappingGroup {
                states,
                selectors: Some(selectors),
            }) => {
                // root line leads with two tag tokens ("Root nr:")
                if let Some(roots) = integer_window(line, 2, MAPPING_GROUP_WIDTH) {
                    self.commit_group(&states, &selectors, &roots);
                }
            }
            None => {
                if line.trim_start().starts_with(MAPPING_HEADER) {
                    if let Some(states) = integer_window(line, 1, MAPPING_GROUP_WIDTH) {
                        if !states.is_empty() {
                            self.pending = Some(PendingMappingGroup {
                                states,
                                selectors: None,
                            });
                        }
                    }
                }
            }
        }
    }

    fn commit_group(&mut self, states: &[u32], selectors: &[u32], roots: &[u32]) {
        if states.len() != selectors.len() || states.len() != roots.len() {
            return;
        }
        for ((state, selector), root) in states.iter().zip(selectors).zip(roots) {
            self.mappings
                .entry(*state)
                .or_default()
                .push(RootMapping::from_selector(*selector, *root));
        }
    }

    /// A group cut short by end-of-file is discarded.
    pub(super) fn finish(self) -> BTreeMap<u32, Vec<RootMapping>> {
        self.mappings
    }
}

/// Collects `RASSI State <n> Total energy: <e>` summary lines. Later lines
/// for the same state overwrite earlier ones.
#[derive(Debug, Default)]
pub(super) struct EnergyScanner {
    energies: BTreeMap<u32, f64>,
}

impl EnergyScanner {
    pub(super) fn offer(&mut self, line: &str) {
        if !line.contains(ENERGY_STATE_MARKER) || !line.contains(ENERGY_VALUE_MARKER) {
            return;
        }

        let mut state: Option<u32> = None;
        let mut energy: Option<f64> = None;
        for token in line.split_whitespace() {
            if let Some(value) = digit_token(token) {
                state = Some(value);
            } else if let Some(value) = energy_token(token) {
                energy = Some(value);
            }
        }

        if let (Some(state), Some(energy)) = (state, energy) {
            self.energies.insert(state, energy);
        }
    }

    pub(super) fn finish(self) -> BTreeMap<u32, f64> {
        self.energies
    }
}

/// Collects the angular-momentum projection table that follows an
/// `SF State` / `Abs_M` header.
///
/// The table ends at the first row with fewer than six tokens or a failed
/// numeric conversion; the scanner then stays inactive for the rest of the
/// file even if the header reappears.
#[derive(Debug, Default)]
pub(super) struct AbsMScanner {
    phase: AbsMPhase,
    values: BTreeMap<u32, f64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum AbsMPhase {
    #[default]
    Idle,
    Active,
    Done,
}

impl AbsMScanner {
    pub(super) fn offer(&mut self, line: &str) {
        match self.phase {
            AbsMPhase::Idle => {
                if line.contains(ABSM_STATE_HEADER) && line.contains(ABSM_VALUE_HEADER) {
                    self.phase = AbsMPhase::Active;
                }
            }
            AbsMPhase::Active => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens.len() < ABSM_MIN_TOKENS {
                    self.phase = AbsMPhase::Done;
                    return;
                }
                match (
                    tokens[0].parse::<u32>(),
                    tokens[ABSM_VALUE_COLUMN].parse::<f64>(),
                ) {
                    (Ok(state), Ok(abs_m)) => {
                        self.values.insert(state, abs_m);
                    }
                    _ => self.phase = AbsMPhase::Done,
                }
            }
            AbsMPhase::Done => {}
        }
    }

    pub(super) fn finish(self) -> BTreeMap<u32, f64> {
        self.values
    }
}

/// All-or-nothing integer window: `width` tokens after skipping `skip`
/// leading tag tokens. Any non-integer token rejects the whole window.
fn integer_window(line: &str, skip: usize, width: usize) -> Option<Vec<u32>> {
    let mut values = Vec::new();
    for token in line.split_whitespace().skip(skip).take(width) {
        match token.parse::<u32>() {
            Ok(value) => values.push(value),
            Err(_) => return None,
        }
    }
    Some(values)
}

fn digit_token(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|character| character.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// A token counts as an energy once a single trailing `:` is stripped and
/// an optional leading `-` leaves digits and dots. Pure-digit tokens are
/// claimed as state numbers first and never reach this check.
fn energy_token(token: &str) -> Option<f64> {
    let stripped = token.strip_suffix(':').unwrap_or(token);
    let unsigned = stripped.strip_prefix('-').unwrap_or(stripped);
    if unsigned.is_empty()
        || !unsigned
            .chars()
            .all(|character| character.is_ascii_digit() || character == '.')
        || !unsigned.chars().any(|character| character.is_ascii_digit())
    {
        return None;
    }
    stripped.parse().ok()
}

pub(super) fn last_token_i32(line: &str) -> Option<i32> {
    line.split_whitespace().next_back()?.parse().ok()
}

pub(super) fn last_token_u32(line: &str) -> Option<u32> {
    line.split_whitespace().next_back()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{
        AbsMScanner, EnergyScanner, JobiphScanner, MappingScanner, energy_token, integer_window,
    };

    #[test]
    fn jobiph_scanner_emits_closed_block_with_tags() {
        let mut scanner = JobiphScanner::default();
        for line in [
            "      Specific data for JOBIPH file JOBIPH",
            "      STATE IRREP:                     3",
            "      SPIN MULTIPLICITY:               1",
            "      NR OF CONFIG:                 1024",
        ] {
            scanner.offer(line);
        }

        let blocks = scanner.finish();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].source_label, "JOBIPH");
        assert_eq!(blocks[0].irrep, Some(3));
        assert_eq!(blocks[0].multiplicity, Some(1));
    }

    #[test]
    fn jobiph_scanner_flushes_open_block_at_end_of_input() {
        let mut scanner = JobiphScanner::default();
        for line in [
            "      Specific data for JOBIPH file JOBIPH01",
            "      STATE IRREP:                     3",
            "      SPIN MULTIPLICITY:               1",
        ] {
            scanner.offer(line);
        }

        let blocks = scanner.finish();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].source_label, "JOBIPH01");
        assert_eq!(blocks[0].irrep, Some(3));
    }

    #[test]
    fn jobiph_scanner_drops_colliding_start_marker_block() {
        let mut scanner = JobiphScanner::default();
        for line in [
            "      Specific data for JOBIPH file JOBIPH",
            "      STATE IRREP:                     4",
            "      Specific data for JOBIPH file JOBIPH01",
            "      SPIN MULTIPLICITY:               3",
        ] {
            scanner.offer(line);
        }

        // the colliding marker closes the first block and its own block
        // (JOBIPH01) is lost; the trailing tag line has no block to fill
        let blocks = scanner.finish();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].source_label, "JOBIPH");
        assert_eq!(blocks[0].irrep, Some(4));
        assert_eq!(blocks[0].multiplicity, None);
    }

    #[test]
    fn jobiph_scanner_emits_partial_block_without_tags() {
        let mut scanner = JobiphScanner::default();
        for line in [
            "      Specific data for JOBIPH file JOBIPH",
            "      NR OF CONFIG:                  512",
        ] {
            scanner.offer(line);
        }

        let blocks = scanner.finish();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].irrep, None);
        assert_eq!(blocks[0].multiplicity, None);
    }

    #[test]
    fn jobiph_scanner_reads_state_list_from_following_line() {
        let mut scanner = JobiphScanner::default();
        for line in [
            "      Specific data for JOBIPH file JOBIPH01",
            "      States included from this file:",
            "          3   4   5",
            "      NR OF CONFIG:                  512",
        ] {
            scanner.offer(line);
        }

        let blocks = scanner.finish();
        assert_eq!(blocks[0].states, vec![3, 4, 5]);
    }

    #[test]
    fn jobiph_scanner_collects_state_nr_tag_lines() {
        let mut scanner = JobiphScanner::default();
        for line in [
            "      Specific data for JOBIPH file JOBIPH",
            "      STATE NR:                        1",
            "      STATE NR:                        2",
            "      NR OF CONFIG:                 1024",
        ] {
            scanner.offer(line);
        }

        let blocks = scanner.finish();
        assert_eq!(blocks[0].states, vec![1, 2]);
    }

    #[test]
    fn mapping_scanner_zips_three_line_groups_positionally() {
        let mut scanner = MappingScanner::default();
        for line in [
            "  State:      1    2    3",
            "  JobIph:     1    1    2",
            "  Root nr:    1    2    1",
        ] {
            scanner.offer(line);
        }

        let mappings = scanner.finish();
        assert_eq!(mappings.len(), 3);
        assert_eq!(mappings[&1][0].jobiph_reference, "JOBIPH");
        assert_eq!(mappings[&1][0].root_index, 1);
        assert_eq!(mappings[&3][0].jobiph_reference, "JOBIPH01");
        assert_eq!(mappings[&3][0].root_index, 1);
    }

    #[test]
    fn mapping_scanner_accumulates_groups_for_the_same_state() {
        let mut scanner = MappingScanner::default();
        for line in [
            "  State:      1",
            "  JobIph:     1",
            "  Root nr:    1",
            "  State:      1",
            "  JobIph:     2",
            "  Root nr:    3",
        ] {
            scanner.offer(line);
        }

        let mappings = scanner.finish();
        assert_eq!(mappings[&1].len(), 2);
        assert_eq!(mappings[&1][1].jobiph_reference, "JOBIPH01");
        assert_eq!(mappings[&1][1].root_index, 3);
    }

    #[test]
    fn mapping_scanner_rejects_groups_with_disagreeing_line_lengths() {
        // a positional zip would silently truncate to two tuples here
        let mut scanner = MappingScanner::default();
        for line in [
            "  State:      1    2    3",
            "  JobIph:     1    1",
            "  Root nr:    1    2    1",
        ] {
            scanner.offer(line);
        }

        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn mapping_scanner_rejects_groups_with_non_integer_tokens() {
        let mut scanner = MappingScanner::default();
        for line in [
            "  State:      1    2",
            "  JobIph:     1    x",
            "  Root nr:    1    2",
        ] {
            scanner.offer(line);
        }

        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn mapping_scanner_discards_group_cut_short_by_end_of_input() {
        let mut scanner = MappingScanner::default();
        for line in ["  State:      1    2", "  JobIph:     1    1"] {
            scanner.offer(line);
        }

        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn energy_scanner_reads_state_and_negative_energy() {
        let mut scanner = EnergyScanner::default();
        scanner.offer("::    RASSI State    1     Total energy:     -149.79308364");

        let energies = scanner.finish();
        assert_eq!(energies.len(), 1);
        assert!((energies[&1] - (-149.79308364)).abs() < 1.0e-12);
    }

    #[test]
    fn energy_scanner_ignores_lines_missing_either_marker() {
        let mut scanner = EnergyScanner::default();
        scanner.offer("::    RASSI State    1");
        scanner.offer("      Total energy:     -149.79308364");

        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn energy_scanner_last_line_wins_for_repeated_states() {
        let mut scanner = EnergyScanner::default();
        for line in [
            "::    RASSI State    2     Total energy:     -149.71022711",
            "::    RASSI State    2     Total energy:     -149.71022800",
        ] {
            scanner.offer(line);
        }

        let energies = scanner.finish();
        assert!((energies[&2] - (-149.71022800)).abs() < 1.0e-12);
    }

    #[test]
    fn energy_token_accepts_colon_and_sign_forms() {
        assert_eq!(energy_token("-149.79308364"), Some(-149.79308364));
        assert_eq!(energy_token("-149.79308364:"), Some(-149.79308364));
        assert_eq!(energy_token("energy:"), None);
        assert_eq!(energy_token("-"), None);
        assert_eq!(energy_token("::"), None);
    }

    #[test]
    fn absm_scanner_reads_rows_after_header() {
        let mut scanner = AbsMScanner::default();
        for line in [
            "  SF State    Energy     RelE      S      Z    Abs_M",
            "      1    -149.79308   0.000    1.0    0.0    0.0",
            "      2    -149.71023   0.083    1.0    0.0    1.0",
        ] {
            scanner.offer(line);
        }

        let values = scanner.finish();
        assert_eq!(values.len(), 2);
        assert!((values[&1] - 0.0).abs() < 1.0e-12);
        assert!((values[&2] - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn absm_scanner_terminates_on_short_row_and_never_reactivates() {
        let mut scanner = AbsMScanner::default();
        for line in [
            "  SF State    Energy     RelE      S      Z    Abs_M",
            "      1    -149.79308   0.000    1.0    0.0    0.0",
            "",
            "  SF State    Energy     RelE      S      Z    Abs_M",
            "      2    -149.71023   0.083    1.0    0.0    1.0",
        ] {
            scanner.offer(line);
        }

        let values = scanner.finish();
        assert_eq!(values.len(), 1);
        assert!(values.contains_key(&1));
    }

    #[test]
    fn absm_scanner_terminates_on_failed_conversion() {
        let mut scanner = AbsMScanner::default();
        for line in [
            "  SF State    Energy     RelE      S      Z    Abs_M",
            "      x    -149.79308   0.000    1.0    0.0    0.0",
            "      1    -149.79308   0.000    1.0    0.0    0.0",
        ] {
            scanner.offer(line);
        }

        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn integer_window_is_all_or_nothing() {
        assert_eq!(
            integer_window("State:  1  2  3", 1, 20),
            Some(vec![1, 2, 3])
        );
        assert_eq!(integer_window("State:  1  x  3", 1, 20), None);
        assert_eq!(integer_window("Root nr:  4  5", 2, 20), Some(vec![4, 5]));
        assert_eq!(integer_window("State:", 1, 20), Some(Vec::new()));
    }
}
