// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

#[test]
fn auth_crate_has_no_store_or_http_dependency() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cargo_toml =
        std::fs::read_to_string(manifest_dir.join("Cargo.toml")).expect("read Cargo.toml");
    for forbidden in [
        "taskboard-store",
        "taskboard-server",
        "rusqlite",
        "axum",
        "tokio",
    ] {
        assert!(
            !cargo_toml.contains(forbidden),
            "forbidden dependency in auth crate: {forbidden}"
        );
    }
}
