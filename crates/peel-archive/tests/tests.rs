use std::fs::File;
use std::io::BufReader;

use peel_archive::test::{bz2_data, gzip_data, tar_archive, xz_data, zip_archive, zstd_data};
use peel_archive::{Error, FormatKind, LeafEntry, Limits, collect_leaves, probe};
use peel_verify::Sha256Hasher;

const PAYLOAD: &[u8] = b"the quick brown fox jumps over the lazy dog";

fn only_leaf(source: &str, data: &[u8]) -> LeafEntry {
    let mut leaves = collect_leaves(source, data, Limits::default()).unwrap();
    assert_eq!(leaves.len(), 1, "expected a single leaf in {source}");
    leaves.remove(0)
}

#[test]
fn every_layering_reproduces_payload() {
    let codecs: [(&str, fn(&[u8]) -> Vec<u8>); 5] = [
        ("raw", |d| d.to_vec()),
        ("gzip", gzip_data),
        ("zstd", zstd_data),
        ("bzip2", bz2_data),
        ("xz", xz_data),
    ];

    for (outer_name, outer) in codecs {
        for (inner_name, inner) in codecs {
            let member = inner(PAYLOAD);
            for (container, archive) in [
                ("tar", tar_archive(&[("data", &member)])),
                ("zip", zip_archive(&[("data", &member)])),
            ] {
                let data = outer(&archive);
                let source = format!("{outer_name}-{container}-{inner_name}");
                let leaf = only_leaf(&source, &data);
                assert_eq!(leaf.path, format!("{source}/data"));
                assert_eq!(leaf.content, PAYLOAD, "{source}");
                assert_eq!(leaf.hash, Sha256Hasher::digest(PAYLOAD));
                assert_eq!(leaf.size, PAYLOAD.len() as u64);
            }
        }
    }
}

#[test]
fn archive_of_archive_appends_member_names() {
    let inner = tar_archive(&[("data", PAYLOAD)]);
    let outer = zip_archive(&[("data", &inner)]);
    let leaf = only_leaf("nested.zip", &outer);
    assert_eq!(leaf.path, "nested.zip/data/data");
    assert_eq!(leaf.content, PAYLOAD);
}

#[test]
fn traversal_is_deterministic() {
    let inner = zip_archive(&[("x", b"1"), ("y", b"2")]);
    let data = gzip_data(&tar_archive(&[("first", &inner), ("second", b"3")]));

    let run = || -> Vec<(String, Vec<u8>)> {
        collect_leaves("src", &data[..], Limits::default())
            .unwrap()
            .into_iter()
            .map(|l| (l.path, l.content))
            .collect()
    };
    let first = run();
    assert_eq!(
        first,
        vec![
            ("src/first/x".to_string(), b"1".to_vec()),
            ("src/first/y".to_string(), b"2".to_vec()),
            ("src/second".to_string(), b"3".to_vec()),
        ]
    );
    assert_eq!(first, run());
}

#[test]
fn probe_reports_top_level_kind() {
    let tarball = tar_archive(&[("data", &gzip_data(b"hello world"))]);
    let cases: Vec<(Vec<u8>, FormatKind)> = vec![
        (b"hello world".to_vec(), FormatKind::Unknown),
        (gzip_data(PAYLOAD), FormatKind::Gzip),
        (zstd_data(PAYLOAD), FormatKind::Zstd),
        (bz2_data(PAYLOAD), FormatKind::Bzip2),
        (xz_data(PAYLOAD), FormatKind::Xz),
        (zip_archive(&[("data", PAYLOAD)]), FormatKind::Zip),
        (tarball.clone(), FormatKind::Tar),
        (gzip_data(&tarball), FormatKind::Tar),
        (zstd_data(&tarball), FormatKind::Tar),
    ];
    for (data, expected) in cases {
        assert_eq!(probe(&data[..]).unwrap(), expected);
    }
}

#[test]
fn walks_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.tar.xz");
    std::fs::write(&path, xz_data(&tar_archive(&[("a.txt", b"alpha")]))).unwrap();

    let reader = BufReader::new(File::open(&path).unwrap());
    let leaves = collect_leaves("bundle.tar.xz", reader, Limits::default()).unwrap();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].path, "bundle.tar.xz/a.txt");
    assert_eq!(leaves[0].layers.to_string(), "xz > tar");
}

#[test]
fn errors_carry_source_identity() {
    let data = gzip_data(&gzip_data(&gzip_data(PAYLOAD)));
    let err = collect_leaves("deep.gz", &data[..], Limits::default().max_depth(2)).unwrap_err();
    assert_eq!(err.source_id(), "deep.gz");
    assert!(err.to_string().contains("deep.gz"));
    assert!(matches!(err, Error::RecursionLimitExceeded { limit: 2, .. }));
}
