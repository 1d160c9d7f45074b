/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::collections::BTreeMap;

use slog::{o, Discard, Logger};

use bundle_types::{
    DateTime, DeltaOp, EntryKind, FileId, InventoryDelta, InventoryEntry, MemoryRepo, Repository,
    Revision, RevisionId, RevisionMut, Sha1,
};
use bundles::{
    read_bundle, BundleFormat, BundleInfo, BundleRecord, BundleWriter, ErrorKind, FormatRegistry,
    VerifyOutcome, DEFAULT_REGISTRY, FORMAT_1_0, FORMAT_2_0,
};

fn logger() -> Logger {
    Logger::root(Discard, o!())
}

fn revision(
    id: &str,
    parents: Vec<&str>,
    message: &str,
    secs: i64,
    tz: i32,
    props: Vec<(&str, &str)>,
) -> Revision {
    let mut properties = BTreeMap::new();
    for (k, v) in props {
        properties.insert(k.to_string(), v.to_string());
    }
    RevisionMut {
        id: RevisionId::new(id),
        parents: parents.into_iter().map(RevisionId::new).collect(),
        committer: "Jane Doe <jane@example.com>".to_string(),
        message: message.to_string(),
        date: DateTime::from_timestamp(secs, tz).unwrap(),
        properties,
    }
    .freeze()
}

fn root_entry() -> InventoryEntry {
    InventoryEntry {
        file_id: FileId::new("fid-root"),
        parent_id: None,
        path: "/".to_string(),
        kind: EntryKind::Dir,
    }
}

fn file_entry(fid: &str, path: &str, fill: u8, executable: bool) -> InventoryEntry {
    InventoryEntry {
        file_id: FileId::new(fid),
        parent_id: Some(FileId::new("fid-root")),
        path: path.to_string(),
        kind: EntryKind::File {
            hash: Sha1::from_byte_array([fill; 20]),
            executable,
        },
    }
}

/// rev-1 adds /a.txt, rev-2 rewrites it and grows a symlink and a
/// subdirectory, rev-merge joins rev-2 and rev-1 with rev-2 first.
fn sample_repo() -> MemoryRepo {
    use bundle_types::Inventory;

    let mut repo = MemoryRepo::new();

    let inv1 = Inventory::from_entries(vec![
        root_entry(),
        file_entry("fid-a", "/a.txt", 0x11, false),
    ]);
    repo.add_revision(
        revision(
            "rev-1",
            vec![],
            "first\ncommit\n",
            1_500_000_000,
            -3600,
            vec![("branch", "main")],
        ),
        inv1,
    );

    let inv2 = Inventory::from_entries(vec![
        root_entry(),
        file_entry("fid-a", "/a.txt", 0x22, true),
        InventoryEntry {
            file_id: FileId::new("fid-s"),
            parent_id: Some(FileId::new("fid-root")),
            path: "/link".to_string(),
            kind: EntryKind::Symlink {
                target: "dest".to_string(),
            },
        },
        InventoryEntry {
            file_id: FileId::new("fid-d"),
            parent_id: Some(FileId::new("fid-root")),
            path: "/sub".to_string(),
            kind: EntryKind::Dir,
        },
    ]);
    repo.add_revision(
        revision(
            "rev-2",
            vec!["rev-1"],
            "second",
            1_500_000_100,
            0,
            vec![("note", "two words")],
        ),
        inv2.clone(),
    );

    let mut inv3 = inv2;
    inv3.insert(file_entry("fid-b", "/b.txt", 0x33, false));
    repo.add_revision(
        revision(
            "rev-merge",
            vec!["rev-2", "rev-1"],
            "merge",
            1_500_000_200,
            0,
            vec![],
        ),
        inv3,
    );

    repo
}

fn ids(names: &[&str]) -> Vec<RevisionId> {
    names.iter().map(|name| RevisionId::new(*name)).collect()
}

fn write_bundle(format: BundleFormat, names: &[&str]) -> String {
    let repo = sample_repo();
    let writer = BundleWriter::new(logger(), format);
    let bytes = writer.to_bytes(&repo, &ids(names)).unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn read(registry: &FormatRegistry, text: &str) -> bundles::errors::Result<BundleInfo> {
    read_bundle(&logger(), registry, text.as_bytes())
}

fn all_verified(outcomes: &[(RevisionId, VerifyOutcome)]) -> bool {
    outcomes
        .iter()
        .all(|(_, outcome)| *outcome == VerifyOutcome::Verified)
}

#[test]
fn round_trip_v2() {
    let repo = sample_repo();
    let text = write_bundle(FORMAT_2_0, &["rev-1", "rev-2", "rev-merge"]);

    let info = read(&DEFAULT_REGISTRY, &text).unwrap();
    assert_eq!(info.format, FORMAT_2_0);
    assert_eq!(info.records.len(), 3);

    for record in &info.records {
        let original = repo.get_revision(record.revision.id()).unwrap();
        assert_eq!(record.revision, original);
    }
    assert_eq!(info.records[0].base, None);
    assert_eq!(info.records[1].base, Some(RevisionId::new("rev-1")));
    assert_eq!(info.records[2].base, Some(RevisionId::new("rev-2")));

    let merge_parents: Vec<_> = info.records[2].revision.parents().cloned().collect();
    assert_eq!(merge_parents, ids(&["rev-2", "rev-1"]));

    let outcomes = info.verify(&logger(), &repo).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(all_verified(&outcomes));
}

#[test]
fn round_trip_v1() {
    let repo = sample_repo();
    let text = write_bundle(FORMAT_1_0, &["rev-1", "rev-2"]);

    let info = read(&DEFAULT_REGISTRY, &text).unwrap();
    assert_eq!(info.format, FORMAT_1_0);

    let outcomes = info.verify(&logger(), &repo).unwrap();
    assert!(all_verified(&outcomes));
}

#[test]
fn verify_resolves_bases_within_the_bundle() {
    let text = write_bundle(FORMAT_2_0, &["rev-1", "rev-2", "rev-merge"]);
    let info = read(&DEFAULT_REGISTRY, &text).unwrap();

    // The receiving side has none of these revisions yet.
    let empty = MemoryRepo::new();
    let outcomes = info.verify(&logger(), &empty).unwrap();
    assert!(all_verified(&outcomes));
}

#[test]
fn verify_needs_base_from_somewhere() {
    let text = write_bundle(FORMAT_2_0, &["rev-2"]);
    let info = read(&DEFAULT_REGISTRY, &text).unwrap();

    let empty = MemoryRepo::new();
    info.verify(&logger(), &empty)
        .expect_err("unexpected OK - base neither in bundle nor repo");

    let outcomes = info.verify(&logger(), &sample_repo()).unwrap();
    assert!(all_verified(&outcomes));
}

#[test]
fn unknown_version_rejected() {
    let text = write_bundle(FORMAT_2_0, &["rev-1"]);

    let mut registry = FormatRegistry::new();
    registry.register(FORMAT_1_0);

    let err = read(&registry, &text).expect_err("unexpected OK - version not registered");
    match err.downcast_ref::<ErrorKind>() {
        Some(ErrorKind::UnsupportedVersion(version)) => assert_eq!(version, "2.0"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn tampered_file_hash_detected() {
    let repo = sample_repo();
    let text = write_bundle(FORMAT_2_0, &["rev-1", "rev-2"]);

    // Corrupt the content hash carried for /a.txt in rev-1's delta.
    let tampered = text.replacen("hash=1111", "hash=3111", 1);
    assert_ne!(tampered, text);

    let info = read(&DEFAULT_REGISTRY, &tampered).unwrap();
    let outcomes = info.verify(&logger(), &repo).unwrap();

    match outcomes[0] {
        (ref id, VerifyOutcome::Mismatch { stored, computed }) => {
            assert_eq!(id, &RevisionId::new("rev-1"));
            assert_ne!(stored, computed);
        }
        ref other => panic!("unexpected outcome: {:?}", other),
    }
    // rev-2 rewrites /a.txt wholesale, so its reconstructed state is
    // unaffected by the corruption in rev-1.
    assert_eq!(outcomes[1].1, VerifyOutcome::Verified);
}

#[test]
fn tampered_symlink_target_detected() {
    let repo = sample_repo();
    let text = write_bundle(FORMAT_2_0, &["rev-1", "rev-2"]);

    let tampered = text.replacen("target=dest", "target=best", 1);
    assert_ne!(tampered, text);

    let info = read(&DEFAULT_REGISTRY, &tampered).unwrap();
    let outcomes = info.verify(&logger(), &repo).unwrap();

    assert_eq!(outcomes[0].1, VerifyOutcome::Verified);
    match outcomes[1].1 {
        VerifyOutcome::Mismatch { .. } => {}
        ref other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn loose_digests_miss_executable_tampering() {
    let repo = sample_repo();
    let text = write_bundle(FORMAT_1_0, &["rev-1", "rev-2"]);

    // rev-2 marks /a.txt executable. Flipping that bit changes the
    // reconstructed inventory but not its loose digest.
    let tampered = text.replacen("exe=yes", "exe=no", 1);
    assert_ne!(tampered, text);

    let info = read(&DEFAULT_REGISTRY, &tampered).unwrap();
    let outcomes = info.verify(&logger(), &repo).unwrap();
    assert!(all_verified(&outcomes));
}

#[test]
fn empty_bundle_reads_ok() {
    let text = "# changeset bundle\n2.0\n#\n";
    let info = read(&DEFAULT_REGISTRY, text).unwrap();
    assert_eq!(info.format, FORMAT_2_0);
    assert!(info.records.is_empty());
}

#[test]
fn writer_requires_revisions() {
    let repo = sample_repo();
    let writer = BundleWriter::new(logger(), FORMAT_2_0);
    writer
        .to_bytes(&repo, &[])
        .expect_err("unexpected OK - nothing to bundle");
}

#[test]
fn malformed_bundles_rejected() {
    let expect_malformed = |text: &str, what: &str| {
        let err = read(&DEFAULT_REGISTRY, text).expect_err(what);
        match err.downcast_ref::<ErrorKind>() {
            Some(ErrorKind::MalformedBundle(_)) => {}
            other => panic!("unexpected error for {}: {:?}", what, other),
        }
    };

    expect_malformed("bogus\n2.0\n#\n", "bad magic");
    expect_malformed("# changeset bundle\n2.0\n", "missing comment line");
    expect_malformed("# changeset bundle\n2.0\n#\nbogus: x\n", "unknown tag");

    let text = write_bundle(FORMAT_2_0, &["rev-1"]);
    let cut = text.find("testament: ").unwrap();
    expect_malformed(&text[..cut], "truncated record");

    let bad_count = text.replacen("parents: 0", "parents: zero", 1);
    expect_malformed(&bad_count, "unparseable count");
}

#[test]
fn conflicting_delta_fails_verify() {
    let repo = sample_repo();
    let record = BundleRecord {
        revision: repo.get_revision(&RevisionId::new("rev-1")).unwrap(),
        base: None,
        delta: InventoryDelta::new(vec![DeltaOp::Delete(FileId::new("fid-missing"))]),
        stored_digest: Sha1::from_byte_array([0; 20]),
    };
    let info = BundleInfo {
        format: FORMAT_2_0,
        records: vec![record],
    };
    info.verify(&logger(), &repo)
        .expect_err("unexpected OK - delta does not fit its base");
}

#[test]
fn revision_ids_in_bundle_order() {
    let text = write_bundle(FORMAT_2_0, &["rev-2", "rev-1"]);
    let info = read(&DEFAULT_REGISTRY, &text).unwrap();
    let listed: Vec<_> = info.revision_ids().cloned().collect();
    assert_eq!(listed, ids(&["rev-2", "rev-1"]));
}
