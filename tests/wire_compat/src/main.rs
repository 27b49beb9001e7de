fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use larkdrive_client::Phase;
    use larkdrive_client::envelope::{
        ApiEnvelope, FileTokenData, FinishRequest, PrepareData, PrepareRequest,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  Rust: {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_upload_all_response() {
        let env = roundtrip_test::<ApiEnvelope>("upload_all_response.json");
        let data: FileTokenData = env.into_data(Phase::UploadAll).unwrap();
        assert_eq!(data.file_token, "boxcnrHpsg1QDqXAAAyachabcef");
    }

    #[test]
    fn fixture_upload_prepare_request() {
        let req = roundtrip_test::<PrepareRequest>("upload_prepare_request.json");
        assert_eq!(req.parent_type, "explorer");
        assert_eq!(req.file_size, 50 * 1024 * 1024);
    }

    #[test]
    fn fixture_upload_prepare_response() {
        let env = roundtrip_test::<ApiEnvelope>("upload_prepare_response.json");
        let data: PrepareData = env.clone().into_data(Phase::Prepare).unwrap();
        assert_eq!(data.upload_id, "7111211691345512356");
        assert_eq!(data.block_size, 4 * 1024 * 1024);
        assert_eq!(
            data.block_num,
            Some(larkdrive_transfer::part_count(50 * 1024 * 1024, data.block_size))
        );

        // The typed payload re-serializes to the fixture's data object.
        assert_eq!(serde_json::to_value(&data).unwrap(), env.data.unwrap());
    }

    #[test]
    fn fixture_upload_finish_request() {
        let req = roundtrip_test::<FinishRequest>("upload_finish_request.json");
        let indices: Vec<u32> = req.block_list.iter().map(|p| p.part_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn fixture_upload_finish_response() {
        let env = roundtrip_test::<ApiEnvelope>("upload_finish_response.json");
        let data: FileTokenData = env.into_data(Phase::Finish).unwrap();
        assert!(!data.file_token.is_empty());
    }

    #[test]
    fn fixture_error_response() {
        let env = roundtrip_test::<ApiEnvelope>("error_response.json");
        let err = env.into_data::<PrepareData>(Phase::Prepare).unwrap_err();
        assert_eq!(err.remote_code(), Some(1061002));
        assert_eq!(err.to_string(), "drive upload_prepare error 1061002: params error.");
    }
}
