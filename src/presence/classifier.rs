//! Maps a telemetry snapshot and its resolved vehicle and map to the
//! status lines shown in the presence.
//!
//! Precedence is the order of [`RULES`]; the first rule whose predicate
//! holds produces the headline and subline.

use crate::map::MapDisplay;
use crate::telemetry::RawTelemetry;
use crate::text::humanize;
use crate::vehicle::{VehicleDomain, VehicleRecord};

use super::state::{PresentationState, LOGO_IMAGE_KEY, LOGO_IMAGE_TEXT};

const IN_BATTLE_TEXT: &str = "In Battle";

/// Everything a rule may look at.
pub struct StatusInput<'a> {
    pub telemetry: &'a RawTelemetry,
    pub vehicle: &'a VehicleRecord,
    pub map: &'a MapDisplay,
}

pub struct StatusRule {
    pub name: &'static str,
    /// The map image replaces the logo while this rule is shown.
    pub shows_map: bool,
    applies: fn(&StatusInput) -> bool,
    lines: fn(&StatusInput) -> (String, String),
}

pub static RULES: &[StatusRule] = &[
    StatusRule {
        name: "offline",
        shows_map: false,
        applies: |input| !input.telemetry.online,
        lines: |_| ("Offline".to_string(), "Waiting for game...".to_string()),
    },
    StatusRule {
        name: "hangar_with_vehicle",
        shows_map: false,
        applies: |input| input.map.is_hangar() && input.vehicle.is_known(),
        lines: idle_lines,
    },
    StatusRule {
        name: "hangar_menu",
        shows_map: false,
        applies: |input| input.map.is_hangar(),
        lines: menu_lines,
    },
    StatusRule {
        name: "battle",
        shows_map: true,
        applies: |input| input.telemetry.in_mission(),
        lines: battle_lines,
    },
    StatusRule {
        name: "idle_with_vehicle",
        shows_map: false,
        applies: |input| input.vehicle.is_known(),
        lines: idle_lines,
    },
    StatusRule {
        name: "menu",
        shows_map: false,
        applies: |_| true,
        lines: menu_lines,
    },
];

/// The first rule that applies. The last rule always does.
pub fn matching_rule(input: &StatusInput) -> &'static StatusRule {
    RULES
        .iter()
        .find(|rule| (rule.applies)(input))
        .unwrap_or(&RULES[RULES.len() - 1])
}

pub fn classify(
    telemetry: &RawTelemetry,
    vehicle: &VehicleRecord,
    map: &MapDisplay,
    session_start: i64,
) -> PresentationState {
    let input = StatusInput {
        telemetry,
        vehicle,
        map,
    };

    let rule = matching_rule(&input);
    let (headline, subline) = (rule.lines)(&input);

    let (large_image_key, large_image_text) = if rule.shows_map {
        map.large_image()
            .unwrap_or_else(|| (LOGO_IMAGE_KEY.to_string(), IN_BATTLE_TEXT.to_string()))
    } else {
        (LOGO_IMAGE_KEY.to_string(), LOGO_IMAGE_TEXT.to_string())
    };

    let small_image_key = vehicle.image_url();
    let small_image_text = small_image_key.as_ref().map(|_| vehicle.caption());

    PresentationState {
        headline,
        subline,
        large_image_key,
        large_image_text,
        small_image_key,
        small_image_text,
        session_start,
    }
}

fn idle_lines(input: &StatusInput) -> (String, String) {
    (
        "Idle in Hangar".to_string(),
        format!("Inspecting {}", input.vehicle.display_name),
    )
}

fn menu_lines(_: &StatusInput) -> (String, String) {
    (
        "In Main Menu/Hangar".to_string(),
        "Waiting for vehicle selection".to_string(),
    )
}

/// Battle category, from the mission type or inferred from the vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleKind {
    Ground,
    Air,
    Naval,
    Custom,
    /// Unrecognised mission type, title-cased for display.
    Other(String),
}

impl BattleKind {
    pub fn resolve(mission_type: Option<&str>, vehicle: &VehicleRecord) -> Self {
        match mission_type {
            None | Some("mission") => match vehicle.id.domain() {
                VehicleDomain::Ground => BattleKind::Ground,
                VehicleDomain::Naval => BattleKind::Naval,
                VehicleDomain::Air => BattleKind::Air,
                VehicleDomain::Unknown => BattleKind::Custom,
            },
            Some(t) if t.contains("ground_battle") || t.contains("ground_match") => {
                BattleKind::Ground
            }
            Some(t) if t.contains("air_battle") || t.contains("air_match") => BattleKind::Air,
            Some(t) if t.contains("naval_battle") => BattleKind::Naval,
            Some(t) if t.contains("Custom Battle") => BattleKind::Custom,
            Some(t) => BattleKind::Other(humanize(t)),
        }
    }
}

fn battle_lines(input: &StatusInput) -> (String, String) {
    let mission_type = input
        .telemetry
        .mission
        .as_ref()
        .and_then(|m| m.mission_type.as_deref());
    let map_name = &input.map.name;

    let label = match BattleKind::resolve(mission_type, input.vehicle) {
        BattleKind::Ground => "Ground",
        BattleKind::Air => "Air",
        BattleKind::Naval => "Naval",
        BattleKind::Custom => "Custom",
        BattleKind::Other(type_name) => {
            return (
                format!("In Battle: {}", type_name),
                format!("Map: {}", map_name),
            );
        }
    };

    (
        format!("In {} Battle on {}", label, map_name),
        action_text(input.vehicle),
    )
}

/// What the player is doing, keyed off the vehicle itself rather than the
/// mission type.
fn action_text(vehicle: &VehicleRecord) -> String {
    let name = &vehicle.display_name;
    match vehicle.id.domain() {
        VehicleDomain::Ground => format!("Driving a {}", name),
        VehicleDomain::Naval => format!("Commanding the {}", name),
        VehicleDomain::Air | VehicleDomain::Unknown => format!("Piloting the {}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Fingerprint, MapValue};
    use crate::telemetry::MissionStatus;
    use crate::vehicle::VehicleId;

    const START: i64 = 1_700_000_000;

    fn online(vehicle: &str, mission: Option<MissionStatus>) -> RawTelemetry {
        RawTelemetry {
            online: true,
            vehicle: VehicleId::parse(vehicle),
            mission,
            map_fingerprint: Fingerprint::of_image(b"map"),
        }
    }

    fn vehicle(raw: &str, name: &str, br: Option<&str>) -> VehicleRecord {
        VehicleRecord {
            id: VehicleId::parse(raw),
            display_name: name.to_string(),
            rating: br.map(str::to_string),
        }
    }

    fn running(mission_type: Option<&str>) -> Option<MissionStatus> {
        Some(MissionStatus {
            running: true,
            mission_type: mission_type.map(str::to_string),
            ..Default::default()
        })
    }

    fn map_ref(s: &str) -> MapValue {
        MapValue::Reference(s.to_string())
    }

    fn rule_for(
        telemetry: &RawTelemetry,
        vehicle: &VehicleRecord,
        map: &MapValue,
    ) -> &'static str {
        let map = MapDisplay::from(map);
        matching_rule(&StatusInput {
            telemetry,
            vehicle,
            map: &map,
        })
        .name
    }

    #[test]
    fn offline_wins_over_everything() {
        let mut t = online("f3d_1", running(None));
        t.online = false;
        let v = vehicle("f3d_1", "F3D-1", None);

        let s = classify(&t, &v, &MapDisplay::from(&MapValue::Hangar), START);

        assert_eq!(s.headline, "Offline");
        assert_eq!(s.subline, "Waiting for game...");
        assert_eq!(s.large_image_key, LOGO_IMAGE_KEY);
    }

    #[test]
    fn hangar_with_vehicle_is_idle() {
        let t = online("f3d_1", running(Some("air_battle")));
        let v = vehicle("f3d_1", "F3D-1", Some("8.7"));

        let s = classify(&t, &v, &MapDisplay::from(&MapValue::Hangar), START);

        assert_eq!(s.headline, "Idle in Hangar");
        assert_eq!(s.subline, "Inspecting F3D-1");
        assert_eq!(s.large_image_key, LOGO_IMAGE_KEY);
        assert_eq!(s.large_image_text, LOGO_IMAGE_TEXT);
        assert_eq!(
            s.small_image_key.as_deref(),
            Some("https://static.encyclopedia.warthunder.com/images/f3d_1.png")
        );
        assert_eq!(s.small_image_text.as_deref(), Some("F3D-1 BR: 8.7"));
    }

    #[test]
    fn hangar_without_vehicle_is_menu() {
        let t = online("unknown_vehicle", None);
        let map = MapDisplay::from(&MapValue::Hangar);
        let s = classify(&t, &VehicleRecord::unknown(), &map, START);

        assert_eq!(s.headline, "In Main Menu/Hangar");
        assert_eq!(s.subline, "Waiting for vehicle selection");
        assert_eq!(s.small_image_key, None);
        assert_eq!(s.small_image_text, None);
    }

    #[test]
    fn ground_battle_from_vehicle_prefix() {
        let t = online("tankmodels/t-34", running(None));
        let v = vehicle("tankmodels/t-34", "T-34", None);
        let map = map_ref("https://example.com/maps/abandoned_town.jpg");

        let s = classify(&t, &v, &MapDisplay::from(&map), START);

        assert_eq!(s.headline, "In Ground Battle on Abandoned Town");
        assert_eq!(s.subline, "Driving a T-34");
        assert_eq!(s.large_image_key, "https://example.com/maps/abandoned_town.jpg");
        assert_eq!(s.large_image_text, "Abandoned Town");
        assert_eq!(s.small_image_text.as_deref(), Some("T-34"));
        assert_eq!(s.session_start, START);
    }

    #[test]
    fn mission_type_beats_vehicle_prefix_for_headline_only() {
        let t = online("tankmodels/m4a3", running(Some("air_match")));
        let v = vehicle("tankmodels/m4a3", "M4A3", None);

        let s = classify(&t, &v, &MapDisplay::from(&map_ref("Port Novorossiysk")), START);

        assert_eq!(s.headline, "In Air Battle on Port Novorossiysk");
        assert_eq!(s.subline, "Driving a M4A3");
        assert_eq!(s.large_image_key, "port_novorossiysk");
        assert_eq!(s.large_image_text, "Port Novorossiysk");
    }

    #[test]
    fn naval_and_air_actions() {
        let t = online("shipmodels/hms_hood", running(Some("naval_battle")));
        let v = vehicle("shipmodels/hms_hood", "HMS Hood", None);
        let s = classify(&t, &v, &MapDisplay::from(&map_ref("Denmark Strait")), START);
        assert_eq!(s.headline, "In Naval Battle on Denmark Strait");
        assert_eq!(s.subline, "Commanding the HMS Hood");

        let t = online("f3d_1", running(Some("mission")));
        let v = vehicle("f3d_1", "F3D-1", None);
        let s = classify(&t, &v, &MapDisplay::from(&map_ref("Korea")), START);
        assert_eq!(s.headline, "In Air Battle on Korea");
        assert_eq!(s.subline, "Piloting the F3D-1");
    }

    #[test]
    fn unknown_vehicle_in_mission_is_custom_battle() {
        let t = online("unknown_vehicle", running(None));
        let map = MapDisplay::from(&map_ref("Korea"));
        let s = classify(&t, &VehicleRecord::unknown(), &map, START);

        assert_eq!(s.headline, "In Custom Battle on Korea");
        assert_eq!(s.subline, "Piloting the Unknown Vehicle");
    }

    #[test]
    fn unrecognised_mission_type_shows_map_in_subline() {
        let t = online("f3d_1", running(Some("enduring_confrontation")));
        let v = vehicle("f3d_1", "F3D-1", None);

        let s = classify(&t, &v, &MapDisplay::from(&map_ref("Korea")), START);

        assert_eq!(s.headline, "In Battle: Enduring Confrontation");
        assert_eq!(s.subline, "Map: Korea");
    }

    #[test]
    fn battle_without_specific_map_keeps_logo() {
        let t = online("f3d_1", running(None));
        let v = vehicle("f3d_1", "F3D-1", None);

        let s = classify(&t, &v, &MapDisplay::from(&MapValue::NeedsName), START);

        assert_eq!(s.headline, "In Air Battle on Unknown Map (Needs Update)");
        assert_eq!(s.large_image_key, LOGO_IMAGE_KEY);
        assert_eq!(s.large_image_text, "In Battle");
    }

    #[test]
    fn placeholder_map_caption_is_pending_upload() {
        let t = online("f3d_1", running(None));
        let v = vehicle("f3d_1", "F3D-1", None);
        let map = map_ref("https://example.com/maps/unknown_map.jpg");

        let s = classify(&t, &v, &MapDisplay::from(&map), START);

        assert_eq!(s.headline, "In Air Battle on Unknown Map (Upload Pending)");
        assert_eq!(s.large_image_key, "https://example.com/maps/unknown_map.jpg");
        assert_eq!(s.large_image_text, "Uploading Map Image");
    }

    #[test]
    fn not_in_mission_falls_back_to_idle() {
        let v = vehicle("f3d_1", "F3D-1", None);
        let t = online("f3d_1", None);
        assert_eq!(rule_for(&t, &v, &map_ref("Korea")), "idle_with_vehicle");

        let disabled = Some(MissionStatus {
            valid: true,
            mission_type: Some("mission".to_string()),
            ..Default::default()
        });
        let t = online("f3d_1", disabled);
        let s = classify(&t, &v, &MapDisplay::from(&map_ref("Korea")), START);
        assert_eq!(s.headline, "Idle in Hangar");
        assert_eq!(s.large_image_key, LOGO_IMAGE_KEY);

        let t = online("unknown_vehicle", None);
        assert_eq!(
            rule_for(&t, &VehicleRecord::unknown(), &MapValue::NotInMission),
            "menu"
        );
    }

    #[test]
    fn rule_order_is_stable() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "offline",
                "hangar_with_vehicle",
                "hangar_menu",
                "battle",
                "idle_with_vehicle",
                "menu"
            ]
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let t = online("tankmodels/t-34", running(Some("ground_battle")));
        let v = vehicle("tankmodels/t-34", "T-34", Some("3.7"));
        let map = MapDisplay::from(&map_ref("https://example.com/maps/abandoned_town.jpg"));

        assert_eq!(classify(&t, &v, &map, START), classify(&t, &v, &map, START));
    }

    #[test]
    fn only_the_battle_rule_shows_the_map_image() {
        let shown: Vec<_> = RULES
            .iter()
            .filter(|rule| rule.shows_map)
            .map(|rule| rule.name)
            .collect();
        assert_eq!(shown, ["battle"]);

        // Known vehicle, no mission, real map: idle keeps the logo.
        let t = online("f3d_1", None);
        let v = vehicle("f3d_1", "F3D-1", None);
        let map = MapDisplay::from(&map_ref("https://example.com/maps/korea.jpg"));

        let s = classify(&t, &v, &map, START);

        assert_eq!(s.headline, "Idle in Hangar");
        assert_eq!(s.large_image_key, LOGO_IMAGE_KEY);
    }
}
