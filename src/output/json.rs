use crate::model::BaselineInfo;
use crate::report::ScanReport;
use anyhow::Result;
use serde::Serialize;

pub fn print_json(report: &ScanReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

#[derive(Serialize)]
struct FeatureEntry<'a> {
    feature: &'a str,
    #[serde(flatten)]
    info: &'a BaselineInfo,
}

pub fn print_json_features(features: &[(String, BaselineInfo)]) -> Result<()> {
    println!("{}", features_to_json(features)?);
    Ok(())
}

fn features_to_json(features: &[(String, BaselineInfo)]) -> Result<String> {
    let entries: Vec<FeatureEntry> = features
        .iter()
        .map(|(feature, info)| FeatureEntry { feature, info })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BaselineStatus;

    #[test]
    fn test_feature_entries_are_flat() {
        let features = vec![(
            "fetch".to_string(),
            BaselineInfo::new(BaselineStatus::WidelyAvailable).with_description("Fetch"),
        )];
        let json: serde_json::Value =
            serde_json::from_str(&features_to_json(&features).unwrap()).unwrap();

        assert_eq!(json[0]["feature"], "fetch");
        assert_eq!(json[0]["status"], "Widely available");
        assert_eq!(json[0]["description"], "Fetch");
    }
}
