use std::collections::BTreeMap;

/// Label of the first job file referenced by a state-interaction run.
/// Higher selector values append a zero-padded counter (`JOBIPH01`, ...).
pub const JOBIPH_BASE_LABEL: &str = "JOBIPH";

/// Everything recovered from one RASSI output file. Built by a single
/// forward pass and discarded once its rows are persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFileRecord {
    /// Internuclear distance decoded from the file name, non-negative.
    pub distance: f64,
    /// Declared state count; informational, not authoritative.
    pub num_states: u32,
    pub jobiph_blocks: Vec<JobiphBlock>,
    /// A state can route through more than one job file/root pair.
    pub state_root_mappings: BTreeMap<u32, Vec<RootMapping>>,
    /// Last value wins when a state number repeats.
    pub energies: BTreeMap<u32, f64>,
    /// Absolute angular-momentum projection per state.
    pub angular_momentum: BTreeMap<u32, f64>,
}

impl ParsedFileRecord {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            num_states: 0,
            jobiph_blocks: Vec::new(),
            state_root_mappings: BTreeMap::new(),
            energies: BTreeMap::new(),
            angular_momentum: BTreeMap::new(),
        }
    }

    pub fn block_for_label(&self, label: &str) -> Option<&JobiphBlock> {
        self.jobiph_blocks
            .iter()
            .find(|block| block.source_label == label)
    }

    pub fn ground_state_energy(&self) -> Option<f64> {
        self.energies.values().copied().min_by(|a, b| a.total_cmp(b))
    }

    /// Total number of (state, mapping) pairs, which is the row count a
    /// store insert produces when every mapped state has an energy.
    pub fn mapping_row_count(&self) -> usize {
        self.state_root_mappings
            .values()
            .map(|mappings| mappings.len())
            .sum()
    }
}

/// Metadata section for one contributing job file. Partial blocks (missing
/// irrep or multiplicity tag lines) are emitted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobiphBlock {
    pub source_label: String,
    pub irrep: Option<i32>,
    pub multiplicity: Option<i32>,
    pub states: Vec<u32>,
}

impl JobiphBlock {
    pub fn new(source_label: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            irrep: None,
            multiplicity: None,
            states: Vec::new(),
        }
    }
}

/// One (job file, root) pair a state routes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootMapping {
    pub jobiph_reference: String,
    pub root_index: u32,
}

impl RootMapping {
    /// Selector 1 names the base job file; selector n > 1 names the file
    /// suffixed with the two-digit zero-padded `n - 1`.
    pub fn from_selector(selector: u32, root_index: u32) -> Self {
        let jobiph_reference = if selector <= 1 {
            JOBIPH_BASE_LABEL.to_string()
        } else {
            format!("{}{:02}", JOBIPH_BASE_LABEL, selector - 1)
        };
        Self {
            jobiph_reference,
            root_index,
        }
    }
}
