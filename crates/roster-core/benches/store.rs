//! Presence store benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use roster_core::PresenceStore;
use roster_protocol::{Event, Identity};

fn users(count: usize) -> Vec<Identity> {
    (0..count)
        .map(|i| Identity::new(format!("User{i}"), format!("u{i}"), "host.example.org"))
        .collect()
}

fn bench_join_part(c: &mut Criterion) {
    let users = users(256);

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(users.len() as u64 * 2));
    group.bench_function("join_part_256", |b| {
        b.iter(|| {
            let mut store = PresenceStore::new();
            store.set_own_nick("bot");
            for user in &users {
                store.join(user, "#bench");
            }
            for user in &users {
                let _ = store.part(user, "#bench");
            }
            black_box(store.stats())
        })
    });
    group.finish();
}

fn bench_names_reply(c: &mut Criterion) {
    let line = (0..400)
        .map(|i| match i % 3 {
            0 => format!("@op{i}"),
            1 => format!("+voice{i}"),
            _ => format!("user{i}"),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let event = Event::names("#bench", line);

    c.bench_function("names_reply_400", |b| {
        b.iter(|| {
            let mut store = PresenceStore::new();
            store.apply(black_box(&event)).unwrap();
            black_box(store.stats())
        })
    });
}

fn bench_quit_across_channels(c: &mut Criterion) {
    let users = users(64);

    c.bench_function("quit_64_users_16_channels", |b| {
        b.iter(|| {
            let mut store = PresenceStore::new();
            for channel in 0..16 {
                let name = format!("#chan{channel}");
                for user in &users {
                    store.join(user, &name);
                }
            }
            for user in &users {
                store.quit(user);
            }
            black_box(store.is_empty())
        })
    });
}

criterion_group!(
    benches,
    bench_join_part,
    bench_names_reply,
    bench_quit_across_channels
);
criterion_main!(benches);
