//! Property-based tests for Settings serialization round-trip.
//!
//! Arbitrary settings must survive JSON serialization, and the file written
//! by the SettingsEngine must load back to the same value.

use proptest::prelude::*;
use smart_history::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use smart_history::types::settings::{
    FocusSession, NoteStoreSettings, Settings, SummarizerSettings, VisitSettings,
};
use smart_history::types::summary::SummaryLength;

fn arb_length() -> impl Strategy<Value = SummaryLength> {
    prop_oneof![
        Just(SummaryLength::Short),
        Just(SummaryLength::Medium),
        Just(SummaryLength::Long),
    ]
}

fn arb_note_store() -> impl Strategy<Value = NoteStoreSettings> {
    (
        prop_oneof![Just("http".to_string()), Just("https".to_string())],
        "[a-z0-9.]{1,20}",
        any::<u16>(),
        proptest::option::of("[A-Za-z0-9]{8,40}"),
        "[A-Za-z0-9 /_-]{1,30}",
        proptest::option::of("[A-Za-z0-9 /_-]{1,30}"),
    )
        .prop_map(|(protocol, host, port, api_key, daily_folder, default_folder)| NoteStoreSettings {
            protocol,
            host,
            port,
            api_key,
            daily_folder,
            default_folder,
        })
}

fn arb_summarizer() -> impl Strategy<Value = SummarizerSettings> {
    (
        proptest::option::of("[A-Za-z0-9_-]{10,40}"),
        "[a-z0-9.-]{3,30}",
        arb_length(),
    )
        .prop_map(|(api_key, model, length)| SummarizerSettings {
            api_key,
            model,
            length,
            ..SummarizerSettings::default()
        })
}

fn arb_visit() -> impl Strategy<Value = VisitSettings> {
    (0u64..3600, 0u32..=100).prop_map(|(secs, pct)| VisitSettings {
        min_visit_duration_secs: secs,
        min_scroll_depth_percent: pct as f64,
    })
}

fn arb_focus() -> impl Strategy<Value = FocusSession> {
    (any::<bool>(), proptest::option::of("[A-Za-z0-9 /._-]{1,40}"))
        .prop_map(|(active, target_note)| FocusSession { active, target_note })
}

fn arb_settings() -> impl Strategy<Value = Settings> {
    (arb_note_store(), arb_summarizer(), arb_visit(), arb_focus()).prop_map(
        |(note_store, summarizer, visit, focus)| Settings {
            note_store,
            summarizer,
            visit,
            focus,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn settings_json_roundtrip(settings in arb_settings()) {
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    #[test]
    fn settings_file_roundtrip(settings in arb_settings()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let mut engine = SettingsEngine::new(Some(path));
        prop_assert_eq!(engine.load().unwrap(), settings);
    }
}
