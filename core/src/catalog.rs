//! Built-in A320 cockpit flows.

use crate::checklist::{ChecklistDefinition, ChecklistItem};

struct StaticFlow {
    name: &'static str,
    note: Option<&'static str>,
    items: &'static [(&'static str, &'static str)],
}

const A320_FLOWS: &[StaticFlow] = &[
    StaticFlow {
        name: "COCKPIT PREPARATION FLOWS",
        note: None,
        items: &[
            ("PFD LT", "BRT"),
            ("ND LT", "BRT"),
            ("ECAM UPPER DISPLAY", "BRT"),
            ("ECAM LOWER DISPLAY", "BRT"),
            ("FLOOD LT", "AS RQRD"),
            ("INTEG LT", "AS RQRD"),
            // overhead panel
            ("BATTERY", "ON - CHECK VOLTAGE"),
            ("EXTERNAL POWER", "ON"),
            ("IRS/ADIRS", "ON"),
            ("ELEC HYDR PUMP", "ON"),
            ("FUEL PUMPS", "ON"),
            ("ENG GEN", "ON/FAULT"),
            ("PACK 1+2", "ON"),
            ("ENG BLEED 1+2", "ON"),
            ("HOT AIR", "ON"),
            ("ENG ANTI ICE/PROBE", "OFF"),
            ("EMERGENCY LIGHTS", "ARMED"),
            ("CABIN SIGNS", "ON"),
            ("NAV & LOGO LIGHTS", "ON"),
            ("EFC 1+2", "ON"),
            ("GPWS", "ON"),
            // pedestal
            ("PARK BRAKE", "SET"),
            ("FLAPS", "VERIFY 0"),
            ("SPEEDBRAKE", "RETRACTED/DISARMED"),
            ("ENG MASTER 1+2", "OFF"),
            ("ENG MODE SEL", "NORM"),
            ("THRUST LEVERS", "IDLE"),
            ("TRANSPONDER", "STANDBY"),
            ("RADIO CONTROL PANEL", "ON"),
            ("FREQUENCIES", "SET"),
            // ECAM & main panel
            ("ECAM RECALL BUTTON", "SELECT"),
            ("LANDING GEAR", "VERIFY DOWN"),
            ("MCDU2 DOORS", "VERIFY OPEN"),
            ("ANTISKID/NWS", "ON"),
            ("FD", "ON"),
        ],
    },
    StaticFlow {
        name: "FMGS SETUP",
        note: None,
        items: &[
            ("ATIS/ATC CLEARANCE", "OBTAIN"),
            ("TRANSPONDER CODE", "SET"),
            ("MCDU", "SET"),
            ("QNH MODE", "VERIFY"),
            ("QNH", "SET"),
            ("ND MODE/RANGE", "SET"),
            ("VOR/ADF", "SELECT"),
            ("SPEED MANAGED/SELECTED", "AS RQRD"),
            ("HDG MANAGED/SELECTED", "AS RQRD"),
            ("INITIAL ALTITUDE SET/MANAGED/SELECTED", "AS RQRD"),
            ("IRS", "CONFIRM ALIGNED"),
            ("FD", "CYCLE OFF THEN ON"),
            ("LS", "OFF"),
            ("FCU", "VERIFY CORRECT & COMPLETE"),
        ],
    },
    StaticFlow {
        name: "BEFORE START FLOWS",
        note: None,
        items: &[
            ("FUELING", "VERIFY DISCONNECTED, KG, BALANCED, & SUFFICIENT"),
            ("CHOCKS", "REMOVED"),
            ("TRAFFIC CONES", "REMOVED"),
            // overhead panel
            ("APU", "START"),
            ("APU BLEED", "ON"),
            ("EXT POWER", "OFF"),
            ("DOORS", "CLOSED"),
            ("BEACON", "ON"),
        ],
    },
    StaticFlow {
        name: "PUSHBACK & ENGINE START FLOWS",
        note: None,
        items: &[
            ("PUSH & START CLEARANCE", "OBTAIN"),
            ("GROUND COMMUNICATION", "INITIATE/FOLLOW COMMANDS"),
            ("RIGHT SIDE", "VERIFY CLEAR"),
            // pedestal
            ("ENG MODE SELECTOR", "IGN/START"),
            ("ENG MASTER 2", "ON"),
            // ECAM
            ("ECAM", "MONITOR"),
            ("ENGINE", "CONFIRM STABILIZED"),
            ("STEP 3, 5-7", "REPEAT FOR ENG 1"),
        ],
    },
    StaticFlow {
        name: "AFTER START FLOWS",
        note: None,
        items: &[
            // overhead panel
            ("ENG & WING ANTI ICE", "AS RQRD"),
            ("APU BLEED", "OFF"),
            ("APU MASTER", "OFF"),
            // pedestal
            ("PITCH TRIM", "SET"),
            ("ENG MODE SELECTOR", "AS RQRD"),
            ("SPOILERS", "ARMED"),
            ("FLAPS", "SET"),
            ("RUD TRIM", "0"),
            // ECAM
            ("FLIGHT CONTROLS", "CHECK"),
            ("ECAM DOOR PAGE", "CHECKED"),
            ("ECAM STATUS", "CHECKED"),
            ("HAND SIGNALS", "RECEIVED"),
        ],
    },
    StaticFlow {
        name: "TAXI FLOWS",
        note: None,
        items: &[
            ("TAXI CLEARANCE", "OBTAIN"),
            ("PARK BRAKE", "RELEASED"),
            ("AUTO BRAKE", "MAX"),
            ("TO CONFIG", "PRESS"),
            ("TAXI LIGHT", "ON"),
        ],
    },
    StaticFlow {
        name: "BEFORE TAKE OFF FLOWS",
        note: None,
        items: &[
            ("TCAS", "TA/RA - TILT ABOVE"),
            ("ENG MODE SELECTOR", "AS RQRD"),
            ("BRAKE TEMP", "CHECK GREATER THAN 150"),
            ("BRAKE FANS", "OFF"),
            ("SLIDING TABLE", "STOWED"),
            ("TAKE OFF/LINE UP CLEARANCE", "OBTAIN"),
            ("EXT LIGHTS", "ON"),
        ],
    },
    StaticFlow {
        name: "AFTER TAKE OFF FLOWS",
        note: Some("At acceleration height"),
        items: &[
            ("SPOILER", "DISARM"),
            ("ENGINE MODE SELECTOR", "AS RQRD"),
            ("TAXI LIGHT", "OFF"),
            ("ENG & WING ANTI ICE", "AS RQRD"),
            ("PACK 1+2", "ON"),
        ],
    },
    StaticFlow {
        name: "10000 FT CLIMB FLOWS",
        note: None,
        items: &[
            ("EXT LIGHTS", "OFF"),
            ("SEAT BELT SIGN", "AS RQRD"),
            ("PRESSURIZATION", "CHECKED"),
        ],
    },
    StaticFlow {
        name: "PREDESCENT FLOWS",
        note: None,
        items: &[
            ("ATIS", "OBTAIN"),
            ("MCDU", "FPLN, PERF, NAV/RAD SET"),
            ("NAV ACCURACY", "CHECK"),
            ("AUTO BRAKE", "SET"),
            ("SEAT BELT SIGN", "ON"),
            ("ANTI ICE", "AS RQRD"),
        ],
    },
    StaticFlow {
        name: "10000 FT DESCENT FLOWS",
        note: None,
        items: &[
            ("SLIDING TABLES", "STOWED"),
            ("EXT LIGHTS", "ON"),
            ("SEAT BELT SIGN", "VERIFY ON"),
            ("LS", "PUSH"),
            ("PRESSURIZATION", "CHECKED"),
            ("ECAM STATUS", "CHECK"),
        ],
    },
    StaticFlow {
        name: "LANDING FLOWS",
        note: Some("When fully configured and established on approach"),
        items: &[
            ("TAXI LIGHT", "SET T/O"),
            ("MISSED APPROACH ALTITUDE", "SET"),
            ("SPOILERS", "ARMED"),
            ("LANDING MEMO", "NO BLUE"),
        ],
    },
    StaticFlow {
        name: "AFTER LANDING FLOWS",
        note: None,
        items: &[
            ("SPOILERS", "RETRACT"),
            ("ENG MODE SELECTOR", "NORM"),
            ("FLAPS", "RETRACT"),
            ("TRANSPONDER", "STBY"),
            ("BRAKE TEMP", "CHECK GREATER THAN 300"),
            ("EXT LIGHTS", "OFF"),
            ("APU", "START"),
            ("ENGINE & WING ANTI ICE", "OFF"),
        ],
    },
    StaticFlow {
        name: "PARKING FLOWS",
        note: None,
        items: &[
            ("PARK BRAKE", "SET"),
            ("ENG MASTER 1+2", "OFF"),
            ("SEAT BELT SIGN", "OFF"),
            ("BEACON", "OFF"),
            ("EXT POWER", "ON"),
            ("FUEL PUMPS", "OFF"),
            ("APU", "AS RQRD"),
        ],
    },
    StaticFlow {
        name: "SECURING FLOWS",
        note: None,
        items: &[
            ("PFD LT", "OFF"),
            ("ND LT", "OFF"),
            ("ECAM UPPER LT", "OFF"),
            ("ECAM LOWER LT", "OFF"),
            ("ADIRS", "OFF"),
            ("EXT POWER", "OFF"),
            ("GEN", "ON"),
            ("APU", "SHUTDOWN"),
            ("CABIN SIGNS & EMERGENCY LIGHTS", "OFF"),
            ("BAT 1+2", "OFF"),
        ],
    },
];

/// The A320 flows in procedure order.
pub fn a320_checklists() -> Vec<ChecklistDefinition> {
    A320_FLOWS
        .iter()
        .map(|f| ChecklistDefinition {
            name: f.name.to_string(),
            note: f.note.map(str::to_string),
            items: f
                .items
                .iter()
                .map(|(item, response)| ChecklistItem::new(*item, *response))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_shape() {
        let defs = a320_checklists();
        assert_eq!(defs.len(), 15);
        assert_eq!(defs.iter().map(|d| d.items.len()).sum::<usize>(), 138);
        assert_eq!(defs[0].name, "COCKPIT PREPARATION FLOWS");
        assert_eq!(defs[14].name, "SECURING FLOWS");
        let noted: Vec<_> = defs.iter().filter(|d| d.note.is_some()).map(|d| d.name.as_str()).collect();
        assert_eq!(noted, vec!["AFTER TAKE OFF FLOWS", "LANDING FLOWS"]);
    }
}
