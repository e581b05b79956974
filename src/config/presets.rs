//! Named bundles of configuration values
//!
//! Each preset kind owns a fixed set of keys. Applying a preset writes every
//! key of its kind and nothing else.

use std::fmt;

use tracing::info;

use super::Configuration;
use crate::constants::keys;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetKind {
    Client,
    Location,
    Endpoint,
}

impl PresetKind {
    pub const ALL: [PresetKind; 3] = [PresetKind::Client, PresetKind::Location, PresetKind::Endpoint];

    /// Keys written by every preset of this kind
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            PresetKind::Client => &[keys::USER_AGENT, keys::CLIENT_VERSION, keys::EXPERIENCE_ID],
            PresetKind::Location => &[keys::LATITUDE, keys::LONGITUDE],
            PresetKind::Endpoint => &[
                keys::API_HOST,
                keys::API_ENDPOINT,
                keys::FACETS_VERSION,
                keys::FACETS_FEATURE_STORE,
                keys::SUBMARKET_ID,
                keys::DISTRICT_ID,
                keys::SESSION_ID,
                keys::CLIENT_REQUEST_ID,
                keys::CORRELATION_ID,
                keys::DD_IDS,
                keys::DD_LOCATION_CONTEXT,
                keys::REALTIME_EVENTS,
                keys::CURSOR,
            ],
        }
    }

    pub fn presets(&self) -> &'static [Preset] {
        match self {
            PresetKind::Client => CLIENT_PRESETS,
            PresetKind::Location => LOCATION_PRESETS,
            PresetKind::Endpoint => ENDPOINT_PRESETS,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.presets().iter().map(|p| p.name)
    }

    pub fn find(&self, name: &str) -> Option<&'static Preset> {
        let name = name.trim();
        self.presets()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PresetKind::Client => "client",
            PresetKind::Location => "location",
            PresetKind::Endpoint => "endpoint",
        })
    }
}

/// Values in the same order as `PresetKind::keys`
#[derive(Debug)]
pub struct Preset {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

const CLIENT_PRESETS: &[Preset] = &[
    Preset {
        name: "iOS Prod",
        values: &[
            "DoordashConsumer/7.26.1 (iPhone; iOS 18.5; Scale/3.0)",
            "ios v7.26.1",
            "doordash",
        ],
    },
    Preset {
        name: "Android Prod",
        values: &["DoorDashConsumer/Android 15.227.5", "android v15.227.5", "doordash"],
    },
    Preset {
        name: "Android Debug",
        values: &[
            "DoorDashConsumer/Android 16.0.0-prod-debug",
            "android v16.0.0-prod-debug b16000009",
            "doordash",
        ],
    },
    Preset {
        name: "Web Chrome",
        values: &[
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36",
            "",
            "doordash",
        ],
    },
];

const LOCATION_PRESETS: &[Preset] = &[
    Preset {
        name: "SF Office",
        values: &["37.78511", "-122.39574"],
    },
    Preset {
        name: "NY Office",
        values: &["40.7410", "-73.9902"],
    },
];

// Captured from app traffic against each backend
const DD_IDS_ANDROID_DEBUG: &str = r#"{"dd_device_id":"78158b794698adba","dd_delivery_correlation_id":"6823d337-a3cf-4072-81b3-aa6fcba69b8d","dd_login_id":"lx_d16f81d2-773c-4f06-9997-b0de82bfbf32","dd_session_id":"sx_eb41331c-72f7-4b26-bba4-1e58f7ba6566","dd_android_id":"78158b794698adba","dd_android_advertising_id":"29804a87-b1f8-4db9-be15-a25ec4606c91"}"#;
const DD_IDS_ANDROID_PROD: &str = r#"{"dd_device_id":"1211c7331d5ffe2f","dd_delivery_correlation_id":"76b077ad-71fb-47e8-8ce9-9b59008f841a","dd_login_id":"lx_f5ccdfd4-f9b5-402c-afee-e9386976fa76","dd_session_id":"sx_9eceac3d-2f25-4be3-b2cb-46d5a1b0aa3f","dd_android_id":"1211c7331d5ffe2f","dd_android_advertising_id":"5136cf26-f0fd-43fd-8bc5-4e96847df333"}"#;
const DD_IDS_IOS: &str = r#"{"dd_ios_idfv_id":"175409C4-E708-4493-B972-48EFE9668407","dd_ios_idfa_id":"00000000-0000-0000-0000-000000000000","dd_login_id":"lx_5451FB95-9C62-407B-9484-EA771FB317E2","dd_device_id":"dx_175409C4-E708-4493-B972-48EFE9668407","dd_delivery_correlation_id":"d63366d8-ae15-4820-ac43-d570b318dc98","dd_session_id":"sx_71A0763A-EB00-4FEE-A3E1-DE1C15F69892"}"#;
const LOCATION_CONTEXT_ANDROID: &str = "eyJsYXQiOjM0LjAyODI5MDMsImxuZyI6LTExOC4zNzM0MjEsIm1hcmtldF9pZCI6IjIiLCJzdWJtYXJrZXRfaWQiOiIxIiwiZGlzdHJpY3RfaWQiOiIzIiwidGltZXpvbmUiOiJBbWVyaWNhL0xvc19BbmdlbGVzIiwiemlwY29kZSI6IjkwMDE2IiwiY291bnRyeV9zaG9ydF9uYW1lIjoiVVMiLCJjaXR5IjoiTG9zIEFuZ2VsZXMiLCJzdGF0ZSI6IkNBIiwiY29uc3VtZXJfYWRkcmVzc19saW5rX2lkIjoiMTQ1NTEyMzQxMiIsImFkZHJlc3NfaWQiOiIzNDUyMzM0MjkiLCJpc19ndWVzdF9jb25zdW1lciI6ZmFsc2V9";
const LOCATION_CONTEXT_IOS: &str = "eyJhZGRyZXNzX2lkIjoiMzQ1MjMzNDI5IiwiY2l0eSI6IkxvcyBBbmdlbGVzIiwiY29uc3VtZXJfYWRkcmVzc19saW5rX2lkIjoiMTQ1NTEyMzQxMiIsImNvdW50cnlfc2hvcnRfbmFtZSI6IlVTIiwiZGlzdHJpY3RfaWQiOiIzIiwiaXNfZ3Vlc3RfY29uc3VtZXIiOmZhbHNlLCJsYXQiOjM0LjAyODI5MDMsImxuZyI6LTExOC4zNzM0MjEsIm1hcmtldF9pZCI6IjIiLCJzdGF0ZSI6IkNBIiwic3VibWFya2V0X2lkIjoiMSIsInRpbWV6b25lIjoiQW1lcmljYVwvTG9zX0FuZ2VsZXMiLCJ6aXBjb2RlIjoiOTAwMTYifQ==";
const STORE_VISIT_EVENTS: &str = r#"[{"action_type":"store_visit","entity_id":"4932","timestamp":"2025-08-07 12:47:57"}]"#;
const HOMEPAGE_CURSOR: &str = "eyJvZmZzZXQiOjAsImNvbnRlbnRfaWRzIjpbXSwicmVxdWVzdF9wYXJlbnRfaWQiOiIiLCJyZXF1ZXN0X2NoaWxkX2lkIjoiIiwicmVxdWVzdF9jaGlsZF9jb21wb25lbnRfaWQiOiIiLCJjcm9zc192ZXJ0aWNhbF9wYWdlX3R5cGUiOiJIT01FUEFHRSIsInBhZ2Vfc3RhY2tfdHJhY2UiOltdLCJ2ZXJ0aWNhbF9pZHMiOlsxMDMsMywyLDE3NCwzNywxMzksMTQ2LDEzNiw3MCwyNjgsMjQxLDIzNSwyMzYsMTEwMDAxLDQsMjM4LDI0MywyODIsMTEwMDE2LDEwMDMzM10sInZlcnRpY2FsX2NvbnRleHRfaWQiOm51bGwsImxheW91dF9vdmVycmlkZSI6IlVOU1BFQ0lGSUVEIiwic2luZ2xlX3N0b3JlX2lkIjpudWxsLCJzZWFyY2hfaXRlbV9jYXJvdXNlbF9jdXJzb3IiOm51bGwsImNhdGVnb3J5X2lkcyI6W10sImNvbGxlY3Rpb25faWRzIjpbXSwiZGRfcGxhY2VfaWRzIjpbImMyNjc5NjAzLTg4OGYtNDI0NC1iZTcxLTYzZDc5NmU4MGNiMCIsImQxYzRhZjBjLTJmNzMtNDljNC05YzkzLWM1OWE4YzMwODcyNSJdLCJuZXh0X3BhZ2VfY2FjaGVfa2V5IjoiVkVSVElDQUw6MTk1NDQyMDg1Ojc4MTU4Yjc5NDY5OGFkYmE6MTplN2E1YTAzMy1hZTA4LTQyY2MtODdjYi1iYzUxODM0MThmYTM6TFo0IiwiaXNfcGFnaW5hdGlvbl9mYWxsYmFjayI6bnVsbCwic291cmNlX3BhZ2VfdHlwZSI6bnVsbCwiZ2VvX3R5cGUiOiIiLCJnZW9faWQiOiIiLCJrZXl3b3JkIjoiIiwiYWRzX2N1cnNvcl9jYWNoZV9rZXkiOm51bGwsInZpc3VhbF9haXNsZXNfaW5zZXJ0aW9uX2luZGV4IjpudWxsLCJiYXNlQ3Vyc29yIjp7InBhZ2VfaWQiOiIiLCJwYWdlX3R5cGUiOiJOT1RfQVBQTElDQUJMRSIsImN1cnNvcl92ZXJzaW9uIjoiRkFDRVQifSwidmVydGljYWxfbmFtZXMiOnt9LCJpdGVtX2lkcyI6W10sIm1lcmNoYW50X3N1cHBsaWVkX2lkcyI6W10sImlzX291dF9vZl9zdG9jayI6bnVsbCwibWVudV9pZCI6bnVsbCwidHJhY2tpbmciOm51bGwsImRpZXRhcnlfdGFnIjpudWxsLCJvcmlnaW5fdGl0bGUiOm51bGwsInJhbmtlZF9yZW1haW5pbmdfY29sbGVjdGlvbl9pZHMiOm51bGwsInByZXZpb3VzbHlfc2Vlbl9jb2xsZWN0aW9uX2lkcyI6W10sInByZWNoZWNrb3V0X2J1bmRsZV9zZWFyY2hfaW5mbyI6bnVsbCwidG90YWxfaXRlbXNfb2Zmc2V0IjowLCJ0b3RhbF9hZHNfcHJldmlvdXNseV9ibGVuZGVkIjowLCJ2ZXJ0aWNhbF90aXRsZSI6bnVsbCwibXVsdGlfc3RvcmVfZW50aXRpZXMiOltdLCJjdXJzb3JWZXJzaW9uIjoiRkFDRVRfQ09OVEVOVF9PRkZTRVQiLCJwYWdlSWQiOiIiLCJwYWdlVHlwZSI6Ik5PVF9BUFBMSUNBQkxFIn0%3D";
const PROD_APP_CURSOR: &str = "eyJvZmZzZXQiOjAsImNvbnRlbnRfaWRzIjpbXSwicmVxdWVzdF9wYXJlbnRfaWQiOiIiLCJyZXF1ZXN0X2NoaWxkX2lkIjoiIiwicmVxdWVzdF9jaGlsZF9jb21wb25lbnRfaWQiOiIiLCJjcm9zc192ZXJ0aWNhbF9wYWdlX3R5cGUiOiJIT01FUEFHRSIsInBhZ2Vfc3RhY2tfdHJhY2UiOltdLCJ2ZXJ0aWNhbF9pZHMiOlsxMDMsMywyLDE3NCwzNywxMzksMTQ2LDEzNiw3MCwyNjgsMjQxLDIzNSwyMzYsMTEwMDAxLDQsMjM4LDI0MywyODIsMTEwMDE2LDEwMDMzM10sInZlcnRpY2FsX2NvbnRleHRfaWQiOm51bGwsImxheW91dF9vdmVycmlkZSI6IlVOU1BFQ0lGSUVEIiwic2luZ2xlX3N0b3JlX2lkIjpudWxsLCJzZWFyY2hfaXRlbV9jYXJvdXNlbF9jdXJzb3IiOm51bGwsImNhdGVnb3J5X2lkcyI6W10sImNvbGxlY3Rpb25faWRzIjpbXSwiZGRfcGxhY2VfaWRzIjpbImMyNjc5NjAzLTg4OGYtNDI0NC1iZTcxLTYzZDc5NmU4MGNiMCIsImQxYzRhZjBjLTJmNzMtNDljNC05YzkzLWM1OWE4YzMwODcyNSJdLCJuZXh0X3BhZ2VfY2FjaGVfa2V5IjoiVkVSVElDQUw6MTk1NDQyMDg1OjEyMTFjNzMzMWQ1ZmZlMmY6MTo4MGZkNWFmMS0yOGZlLTQ3YzctYjljNS0zZTE2MGU1OGRhMmY6TFo0IiwiaXNfcGFnaW5hdGlvbl9mYWxsYmFjayI6bnVsbCwic291cmNlX3BhZ2VfdHlwZSI6bnVsbCwiZ2VvX3R5cGUiOiIiLCJnZW9faWQiOiIiLCJrZXl3b3JkIjoiIiwiYWRzX2N1cnNvcl9jYWNoZV9rZXkiOm51bGwsInZpc3VhbF9haXNsZXNfaW5zZXJ0aW9uX2luZGV4IjpudWxsLCJiYXNlQ3Vyc29yIjp7InBhZ2VfaWQiOiIiLCJwYWdlX3R5cGUiOiJOT1RfQVBQTElDQUJMRSIsImN1cnNvcl92ZXJzaW9uIjoiRkFDRVQifSwidmVydGljYWxfbmFtZXMiOnt9LCJpdGVtX2lkcyI6W10sIm1lcmNoYW50X3N1cHBsaWVkX2lkcyI6W10sImlzX291dF9vZl9zdG9jayI6bnVsbCwibWVudV9pZCI6bnVsbCwidHJhY2tpbmciOm51bGwsImRpZXRhcnlfdGFnIjpudWxsLCJvcmlnaW5fdGl0bGUiOm51bGwsInJhbmtlZF9yZW1haW5pbmdfY29sbGVjdGlvbl9pZHMiOm51bGwsInByZXZpb3VzbHlfc2Vlbl9jb2xsZWN0aW9uX2lkcyI6W10sInByZWNoZWNrb3V0X2J1bmRsZV9zZWFyY2hfaW5mbyI6bnVsbCwidG90YWxfaXRlbXNfb2Zmc2V0IjowLCJ0b3RhbF9hZHNfcHJldmlvdXNseV9ibGVuZGVkIjowLCJ2ZXJ0aWNhbF90aXRsZSI6bnVsbCwibXVsdGlfc3RvcmVfZW50aXRpZXMiOltdLCJjdXJzb3JWZXJzaW9uIjoiRkFDRVRfQ09OVEVOVF9PRkZTRVQiLCJwYWdlSWQiOiIiLCJwYWdlVHlwZSI6Ik5PVF9BUFBMSUNBQkxFIn0=";

const ENDPOINT_PRESETS: &[Preset] = &[
    Preset {
        name: "Unified Realtime",
        values: &[
            "unified-gateway.doordash.com",
            "realtime_recommendation",
            "4.0.0",
            "treatmentVariant3",
            "1",
            "3",
            "88d4f03e-14d2-44bb-a1e0-084db5d7bd0f-dd-and",
            "0b7956f5-3b04-4fcc-bf13-5f83916d5ad7-dd-and",
            "348fce35-5953-415e-a0bf-02394a8a6cd7-dd-and",
            DD_IDS_ANDROID_DEBUG,
            LOCATION_CONTEXT_ANDROID,
            STORE_VISIT_EVENTS,
            "",
        ],
    },
    Preset {
        name: "Homepage",
        values: &[
            "consumer-mobile-bff.doordash.com",
            "homepage",
            "4.0.0",
            "treatmentVariant3",
            "1",
            "3",
            "88d4f03e-14d2-44bb-a1e0-084db5d7bd0f-dd-and",
            "0b7956f5-3b04-4fcc-bf13-5f83916d5ad7-dd-and",
            "348fce35-5953-415e-a0bf-02394a8a6cd7-dd-and",
            DD_IDS_ANDROID_DEBUG,
            LOCATION_CONTEXT_ANDROID,
            STORE_VISIT_EVENTS,
            HOMEPAGE_CURSOR,
        ],
    },
    Preset {
        name: "Prod App",
        values: &[
            "consumer-mobile-bff.doordash.com",
            "homepage",
            "4.0.0",
            "treatmentVariant3",
            "1",
            "3",
            "6703ac28-37e9-406c-a4d2-f7467a2bab19-dd-and",
            "4fb49653-4bd4-40b7-b2bd-7bf87a2a4885-dd-and",
            "3f28aa97-e023-43ec-aace-a17500a8e20f-dd-and",
            DD_IDS_ANDROID_PROD,
            LOCATION_CONTEXT_ANDROID,
            "[]",
            PROD_APP_CURSOR,
        ],
    },
    Preset {
        name: "Feed Me",
        values: &[
            "consumer-mobile-bff.doordash.com",
            "feed_me",
            "6.0.0",
            "treatmentVariant3",
            "1",
            "3",
            "7DCCF941-573F-4DB5-BABF-4DD06ADFC539-cx-ios",
            "0D4ED886-7FD9-47BA-BBD7-A31C9127B600-cx-ios",
            "FE22D422-E4BC-4040-94EB-096986CEAB16-cx-ios",
            DD_IDS_IOS,
            LOCATION_CONTEXT_IOS,
            "[]",
            "",
        ],
    },
    Preset {
        name: "Experiments",
        values: &[
            "dynamic-values-edge-service.doordash.com",
            "experiments",
            "4.0.0",
            "treatmentVariant3",
            "1",
            "3",
            "4e978b72-6fe4-46bc-8ab1-bf4dc15f044a-dd-and",
            "f2e5d745-6d07-4617-927a-bd7e9ef684e7-dd-and",
            "3d682d82-3ee7-4340-b45a-ca5e61d5c472-dd-and",
            DD_IDS_ANDROID_DEBUG,
            LOCATION_CONTEXT_ANDROID,
            "{}",
            "",
        ],
    },
];

/// Apply the preset `name` of `kind` to `config`, returning the updated copy.
/// Unknown names leave the caller's configuration untouched.
pub fn apply_preset(
    mut config: Configuration,
    name: &str,
    kind: PresetKind,
) -> Result<Configuration, ConfigError> {
    let Some(preset) = kind.find(name) else {
        return Err(ConfigError::UnknownPreset {
            kind,
            name: name.to_string(),
            available: kind.names().collect::<Vec<_>>().join(", "),
        });
    };

    for (key, value) in kind.keys().iter().zip(preset.values) {
        config.set(*key, *value);
    }
    info!(kind = %kind, preset = preset.name, "applied preset");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn populated() -> Configuration {
        let mut config = Configuration::new();
        for (i, param) in crate::config::catalog::PARAMETERS.iter().enumerate() {
            config.set(param.key, format!("original-{i}"));
        }
        config.set("CUSTOM_KEY", "custom");
        config
    }

    #[test]
    fn test_every_preset_has_one_value_per_key() {
        for kind in PresetKind::ALL {
            for preset in kind.presets() {
                assert_eq!(preset.values.len(), kind.keys().len(), "{}", preset.name);
            }
        }
    }

    #[test]
    fn test_preset_kinds_write_disjoint_keys() {
        let mut seen = std::collections::HashSet::new();
        for kind in PresetKind::ALL {
            for key in kind.keys() {
                assert!(seen.insert(*key), "{key} owned by two kinds");
            }
        }
    }

    #[test]
    fn test_presets_overwrite_exactly_their_keys() {
        for kind in PresetKind::ALL {
            for preset in kind.presets() {
                let before = populated();
                let after = apply_preset(before.clone(), preset.name, kind).unwrap();

                assert_eq!(after.len(), before.len());
                for (key, old) in before.iter() {
                    let new = after.value(key);
                    if let Some(idx) = kind.keys().iter().position(|k| *k == key) {
                        assert_eq!(new, preset.values[idx], "{} {key}", preset.name);
                    } else {
                        assert_eq!(new, old, "{} touched {key}", preset.name);
                    }
                }
            }
        }
    }

    #[test]
    fn test_client_preset_values() {
        let config = apply_preset(Configuration::new(), "android debug", PresetKind::Client).unwrap();
        assert_eq!(config.value(keys::USER_AGENT), "DoorDashConsumer/Android 16.0.0-prod-debug");
        assert_eq!(config.value(keys::CLIENT_VERSION), "android v16.0.0-prod-debug b16000009");
        assert_eq!(config.value(keys::EXPERIENCE_ID), "doordash");
    }

    #[test]
    fn test_location_preset_values() {
        let config = apply_preset(Configuration::new(), "NY Office", PresetKind::Location).unwrap();
        assert_eq!(config.value(keys::LATITUDE), "40.7410");
        assert_eq!(config.value(keys::LONGITUDE), "-73.9902");
    }

    #[test]
    fn test_endpoint_presets_set_backend_headers() {
        let feed_me = apply_preset(populated(), "feed me", PresetKind::Endpoint).unwrap();
        assert_eq!(feed_me.value(keys::API_ENDPOINT), "feed_me");
        assert_eq!(feed_me.value(keys::FACETS_VERSION), "6.0.0");
        assert_eq!(feed_me.value(keys::REALTIME_EVENTS), "[]");
        assert_eq!(feed_me.value(keys::CURSOR), "");
        assert!(feed_me.value(keys::SESSION_ID).ends_with("-cx-ios"));

        let realtime = apply_preset(feed_me, "Unified Realtime", PresetKind::Endpoint).unwrap();
        assert_eq!(realtime.value(keys::API_HOST), "unified-gateway.doordash.com");
        assert_eq!(realtime.value(keys::FACETS_VERSION), "4.0.0");
        assert_eq!(realtime.value(keys::SUBMARKET_ID), "1");
        assert_eq!(realtime.value(keys::DISTRICT_ID), "3");
        assert!(realtime.value(keys::SESSION_ID).ends_with("-dd-and"));
        assert!(realtime.value(keys::REALTIME_EVENTS).contains("store_visit"));
        assert!(serde_json::from_str::<serde_json::Value>(realtime.value(keys::DD_IDS)).is_ok());
    }

    #[test]
    fn test_prod_app_preset_targets_homepage() {
        let config = apply_preset(Configuration::new(), "prod app", PresetKind::Endpoint).unwrap();
        assert_eq!(config.value(keys::API_HOST), "consumer-mobile-bff.doordash.com");
        assert_eq!(config.value(keys::API_ENDPOINT), "homepage");
        assert!(!config.value(keys::CURSOR).is_empty());
        assert_ne!(config.value(keys::CURSOR), HOMEPAGE_CURSOR);
    }

    #[test]
    fn test_unknown_preset_lists_alternatives() {
        let err = apply_preset(populated(), "Tokyo Office", PresetKind::Location).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown location preset 'Tokyo Office'"));
        assert!(message.contains("SF Office, NY Office"));
    }

    #[test]
    fn test_preset_kind_lookup_is_kind_scoped() {
        // "Homepage" is an endpoint preset, not a client one
        assert!(PresetKind::Endpoint.find("homepage").is_some());
        assert!(PresetKind::Client.find("homepage").is_none());
    }
}
