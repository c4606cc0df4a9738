use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use marshal::{
    decode_entry_full, encode_entry_full, encode_entry_redacted, KeyContents, KeyData,
    MarshalLimits, PrincipalEntry, TlData,
};
use storage::{PrincipalName, StorageReader, StorageWriter};

fn sample_entry() -> PrincipalEntry {
    let salt = KeyContents::new(3, b"EXAMPLE.COMhostkdc.example.com".to_vec());
    PrincipalEntry {
        principal: Some(PrincipalName::new("EXAMPLE.COM", ["host", "kdc.example.com"])),
        max_life: 36_000,
        mod_name: Some(PrincipalName::new("EXAMPLE.COM", ["admin", "admin"])),
        mod_date: 1_700_000_000,
        kvno: 4,
        policy: Some("hosts".to_owned()),
        max_renewable_life: 604_800,
        key_data: [(18, 32), (17, 16), (16, 24)]
            .into_iter()
            .map(|(enctype, len)| KeyData {
                version: 2,
                kvno: 4,
                key: KeyContents::new(enctype, vec![0x5A; len]),
                salt: salt.clone(),
            })
            .collect(),
        tl_data: (0..4).map(|kind| TlData::new(kind, vec![0; 16])).collect(),
        ..PrincipalEntry::default()
    }
}

fn bench_entry(c: &mut Criterion) {
    let entry = sample_entry();
    let mut writer = StorageWriter::new();
    encode_entry_full(&mut writer, &entry).unwrap();
    let bytes = writer.finish();
    let limits = MarshalLimits::default();

    let mut group = c.benchmark_group("principal_entry");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("encode_full", |b| {
        b.iter(|| {
            let mut writer = StorageWriter::new();
            encode_entry_full(&mut writer, black_box(&entry)).unwrap();
            black_box(writer.finish())
        });
    });

    group.bench_function("encode_redacted", |b| {
        b.iter(|| {
            let mut writer = StorageWriter::new();
            encode_entry_redacted(&mut writer, black_box(&entry)).unwrap();
            black_box(writer.finish())
        });
    });

    group.bench_function("decode_full", |b| {
        b.iter(|| {
            let mut reader = StorageReader::new(black_box(&bytes));
            black_box(decode_entry_full(&mut reader, &limits).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_entry);
criterion_main!(benches);
