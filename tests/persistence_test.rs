use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn cmd(cart_path: &std::path::Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("storefront-checkout"));
    cmd.arg("--cart-path").arg(cart_path);
    cmd
}

#[test]
fn test_cart_survives_process_restart() {
    let dir = tempdir().unwrap();
    let cart = dir.path().join("cart.json");

    // First run: add a line.
    cmd(&cart)
        .args([
            "add",
            "--product-id",
            "mattress-orto",
            "--name",
            "Orto Premium",
            "--price",
            "49895",
            "--variant",
            "140x200",
        ])
        .assert()
        .success();

    // Second run: the snapshot is recovered and merged into.
    cmd(&cart)
        .args([
            "add",
            "--product-id",
            "mattress-orto",
            "--name",
            "Orto Premium",
            "--price",
            "49895",
            "--quantity",
            "2",
            "--variant",
            "140x200",
        ])
        .assert()
        .success();

    cmd(&cart)
        .arg("totals")
        .assert()
        .success()
        .stdout(predicate::str::contains("3,149685"));
}

#[test]
fn test_corrupt_snapshot_resets_to_empty_cart() {
    let dir = tempdir().unwrap();
    let cart = dir.path().join("cart.json");
    std::fs::write(&cart, b"{ definitely not a cart").unwrap();

    // A corrupt snapshot must not crash or error; the cart starts empty.
    cmd(&cart)
        .arg("totals")
        .assert()
        .success()
        .stdout(predicate::str::contains("0,0"));

    // The next mutation overwrites the corrupt file with a valid snapshot.
    cmd(&cart)
        .args([
            "add",
            "--product-id",
            "pillow-cloud",
            "--name",
            "Cloud Pillow",
            "--price",
            "120.50",
        ])
        .assert()
        .success();

    cmd(&cart)
        .arg("totals")
        .assert()
        .success()
        .stdout(predicate::str::contains("1,120.50"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("cart_db");

    let mut cmd1 = Command::new(cargo_bin!("storefront-checkout"));
    cmd1.arg("--db-path").arg(&db_path).args([
        "add",
        "--product-id",
        "mattress-orto",
        "--name",
        "Orto Premium",
        "--price",
        "49895",
    ]);
    cmd1.assert().success();

    let mut cmd2 = Command::new(cargo_bin!("storefront-checkout"));
    cmd2.arg("--db-path").arg(&db_path).arg("totals");
    cmd2.assert()
        .success()
        .stdout(predicate::str::contains("1,49895"));
}
