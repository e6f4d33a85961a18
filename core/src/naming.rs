//! Deterministic ids and filenames for audio requests.

/// Longest item slug kept in an item filename.
pub const ITEM_SLUG_MAX: usize = 30;

pub const AUDIO_EXTENSION: &str = "wav";

/// Lowercase, map everything outside `[a-z0-9]` to `_`, collapse runs of `_`
/// and trim them from both ends.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

/// `slugify` cut to [`ITEM_SLUG_MAX`] characters; may end mid-word or on `_`.
pub fn item_slug(item: &str) -> String {
    let mut slug = slugify(item);
    slug.truncate(ITEM_SLUG_MAX);
    slug
}

pub fn item_filename(flow_slug: &str, index: usize, item: &str) -> String {
    format!("{flow_slug}_{index:02}_{}.{AUDIO_EXTENSION}", item_slug(item))
}

pub fn start_filename(flow_slug: &str) -> String {
    format!("{}.{AUDIO_EXTENSION}", start_id(flow_slug))
}

pub fn complete_filename(flow_slug: &str) -> String {
    format!("{}.{AUDIO_EXTENSION}", complete_id(flow_slug))
}

/// Item ids only replace spaces, unlike the filename slug.
pub fn item_id(flow_name: &str, index: usize) -> String {
    format!("{}_{index}", flow_name.to_lowercase().replace(' ', "_"))
}

pub fn start_id(flow_slug: &str) -> String {
    format!("{flow_slug}_start")
}

pub fn complete_id(flow_slug: &str) -> String {
    format!("{flow_slug}_complete")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("PUSHBACK & ENGINE START FLOWS"), "pushback_engine_start_flows");
        assert_eq!(slugify("  IRS/ADIRS  "), "irs_adirs");
        assert_eq!(slugify("STEP 3, 5-7"), "step_3_5_7");
        assert_eq!(slugify("ÅRE ÖVER"), "re_ver");
        assert_eq!(slugify("&/-"), "");
    }

    #[test]
    fn item_filenames() {
        assert_eq!(
            item_filename("cockpit_preparation_flows", 0, "PFD LT"),
            "cockpit_preparation_flows_00_pfd_lt.wav"
        );
        assert_eq!(item_filename("taxi_flows", 12, "FD"), "taxi_flows_12_fd.wav");
    }

    #[test]
    fn item_slug_truncates_after_trimming() {
        let slug = item_slug("CABIN SIGNS & EMERGENCY LIGHTS TEST");
        assert_eq!(slug, "cabin_signs_emergency_lights_t");
        assert_eq!(slug.len(), ITEM_SLUG_MAX);
        assert_eq!(item_slug("INITIAL ALTITUDE SET/MANAGED/SELECTED"), "initial_altitude_set_managed_s");
        // cut lands on a separator, which is kept
        assert_eq!(item_slug("ABCDEFGHIJKLMNOPQRSTUVWXYZABC DEF"), "abcdefghijklmnopqrstuvwxyzabc_");
    }

    #[test]
    fn marker_names() {
        assert_eq!(start_filename("10000_ft_climb_flows"), "10000_ft_climb_flows_start.wav");
        assert_eq!(complete_filename("taxi_flows"), "taxi_flows_complete.wav");
        assert_eq!(start_id("taxi_flows"), "taxi_flows_start");
    }

    #[test]
    fn item_ids_keep_punctuation() {
        assert_eq!(item_id("PUSHBACK & ENGINE START FLOWS", 3), "pushback_&_engine_start_flows_3");
    }
}
