use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use sealkeep_testkit::TestFixture;

fn bench_decrypt_by_position(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("decrypt");

    for grants in [1usize, 16, 64] {
        let fixture = TestFixture::new();
        let acl = fixture.master("bench", None);
        let viewers: Vec<_> = runtime.block_on(async {
            let mut viewers = Vec::new();
            for _ in 0..grants {
                let viewer = fixture.viewer().await;
                acl.add_viewer(&viewer.url()).await.unwrap();
                viewers.push(viewer);
            }
            viewers
        });
        let ciphertext = acl.encrypt(&[0u8; 1024]).unwrap();

        // The last grantee is found after scanning every entry.
        let last = vec![Arc::clone(viewers.last().unwrap())];
        group.bench_with_input(BenchmarkId::new("last_viewer", grants), &grants, |b, _| {
            b.iter(|| acl.decrypt(&ciphertext, &last).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decrypt_by_position);
criterion_main!(benches);
