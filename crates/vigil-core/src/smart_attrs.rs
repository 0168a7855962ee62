//! SMART attribute catalog: names and health importance per attribute id.
//! Used to build human-readable issue descriptions and to select which
//! counters the delta rules watch.

/// How strongly an attribute predicts drive failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    /// Failure likely imminent when nonzero or rising.
    Critical,
    /// Strong indicator of problems.
    High,
    /// Worth monitoring.
    Medium,
    /// Informational.
    Low,
}

/// Static definition of one SMART attribute.
#[derive(Debug, Clone, Copy)]
pub struct SmartAttr {
    pub id: u8,
    pub name: &'static str,
    pub importance: Importance,
    /// Whether an increase between consecutive readings is actionable.
    /// Cumulative-since-manufacture counters with a static nonzero
    /// baseline are not.
    pub delta_monitored: bool,
}

/// Catalog of the attributes Vigil understands. The watched subset that
/// the disk evaluator reads is `WATCHED_ATA_ATTRS`.
pub const SMART_ATTRS: &[SmartAttr] = &[
    SmartAttr { id: 1, name: "Read Error Rate", importance: Importance::Medium, delta_monitored: false },
    SmartAttr { id: 3, name: "Spin-Up Time", importance: Importance::Low, delta_monitored: false },
    SmartAttr { id: 4, name: "Start/Stop Count", importance: Importance::Low, delta_monitored: false },
    SmartAttr { id: 5, name: "Reallocated Sectors", importance: Importance::Critical, delta_monitored: true },
    SmartAttr { id: 9, name: "Power-On Hours", importance: Importance::Low, delta_monitored: false },
    SmartAttr { id: 10, name: "Spin Retry Count", importance: Importance::High, delta_monitored: true },
    SmartAttr { id: 12, name: "Power Cycle Count", importance: Importance::Low, delta_monitored: false },
    SmartAttr { id: 184, name: "End-to-End Error", importance: Importance::Critical, delta_monitored: true },
    SmartAttr { id: 187, name: "Reported Uncorrectable", importance: Importance::Critical, delta_monitored: true },
    SmartAttr { id: 188, name: "Command Timeout", importance: Importance::Medium, delta_monitored: false },
    SmartAttr { id: 190, name: "Airflow Temperature", importance: Importance::Low, delta_monitored: false },
    SmartAttr { id: 194, name: "Temperature", importance: Importance::Low, delta_monitored: false },
    SmartAttr { id: 196, name: "Reallocation Events", importance: Importance::High, delta_monitored: true },
    SmartAttr { id: 197, name: "Current Pending Sectors", importance: Importance::Critical, delta_monitored: true },
    SmartAttr { id: 198, name: "Offline Uncorrectable", importance: Importance::Critical, delta_monitored: true },
    SmartAttr { id: 199, name: "UDMA CRC Errors", importance: Importance::Medium, delta_monitored: true },
];

/// The ATA attribute ids the normalizer carries into readings.
pub const WATCHED_ATA_ATTRS: &[u8] = &[5, 187, 188, 197, 198, 199];

/// Look up an attribute definition by id.
pub fn lookup(id: u8) -> Option<&'static SmartAttr> {
    SMART_ATTRS.iter().find(|a| a.id == id)
}

/// Human-readable name for an attribute, falling back to `attribute <id>`.
pub fn display_name(id: u8) -> String {
    match lookup(id) {
        Some(attr) => attr.name.to_string(),
        None => format!("attribute {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watched_attrs_are_all_in_catalog() {
        for id in WATCHED_ATA_ATTRS {
            assert!(lookup(*id).is_some(), "attr {id} missing from catalog");
        }
    }

    #[test]
    fn display_name_falls_back_for_unknown_ids() {
        assert_eq!(display_name(5), "Reallocated Sectors");
        assert_eq!(display_name(250), "attribute 250");
    }
}
