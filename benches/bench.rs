use std::{
  collections::BTreeSet,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  thread,
};

use criterion::*;
use parking_lot::Mutex;
use rand::prelude::*;
use vskl::SkipSet;

const RANGE: i64 = 1 << 16;

trait IntSet: Send + Sync + 'static {
  fn insert(&self, key: i64) -> bool;
  fn remove(&self, key: i64) -> bool;
  fn contains(&self, key: i64) -> bool;
}

impl IntSet for SkipSet {
  fn insert(&self, key: i64) -> bool {
    SkipSet::insert(self, key)
  }

  fn remove(&self, key: i64) -> bool {
    SkipSet::remove(self, key)
  }

  fn contains(&self, key: i64) -> bool {
    SkipSet::contains(self, key)
  }
}

impl IntSet for Mutex<BTreeSet<i64>> {
  fn insert(&self, key: i64) -> bool {
    self.lock().insert(key)
  }

  fn remove(&self, key: i64) -> bool {
    self.lock().remove(&key)
  }

  fn contains(&self, key: i64) -> bool {
    self.lock().contains(&key)
  }
}

/// Runs one operation, an update with probability `update / 10`.
fn round(set: &impl IntSet, rng: &mut impl Rng, update: usize) {
  let key = rng.random_range(0..RANGE);
  if update > rng.random_range(0..10) {
    if rng.random_bool(0.5) {
      set.insert(key);
    } else {
      set.remove(key);
    }
  } else {
    set.contains(key);
  }
}

fn prefill(set: &impl IntSet) {
  let mut rng = StdRng::seed_from_u64(0);
  for _ in 0..RANGE / 2 {
    set.insert(rng.random_range(0..RANGE));
  }
}

/// Measures one thread's throughput while `background` threads run the same
/// mix on the same set.
fn bench_mix<S: IntSet>(b: &mut Bencher<'_>, set: Arc<S>, update: usize, background: usize) {
  prefill(&*set);
  let stop = Arc::new(AtomicBool::new(false));
  let handles: Vec<_> = (0..background)
    .map(|t| {
      let (set, stop) = (set.clone(), stop.clone());
      thread::spawn(move || {
        let mut rng = StdRng::seed_from_u64(t as u64 + 1);
        while !stop.load(Ordering::Relaxed) {
          round(&*set, &mut rng, update);
        }
      })
    })
    .collect();

  let mut rng = rand::rng();
  b.iter(|| round(&*set, &mut rng, update));

  stop.store(true, Ordering::Relaxed);
  for h in handles {
    h.join().unwrap();
  }
}

fn bench_read_write(c: &mut Criterion) {
  let background = thread::available_parallelism()
    .map(|n| n.get().saturating_sub(1))
    .unwrap_or(3)
    .min(7);

  for update in [0, 2, 5] {
    let mut group = c.benchmark_group(format!("update_{}0_percent", update));
    group.bench_function(BenchmarkId::new("vskl", background), |b| {
      bench_mix(b, Arc::new(SkipSet::new()), update, background)
    });
    group.bench_function(BenchmarkId::new("mutex_btreeset", background), |b| {
      bench_mix(b, Arc::new(Mutex::new(BTreeSet::new())), update, background)
    });
    group.finish();
  }
}

fn bench_single_thread(c: &mut Criterion) {
  let mut group = c.benchmark_group("single_thread");
  group.bench_function("insert_remove", |b| {
    let set = SkipSet::new();
    let mut rng = StdRng::seed_from_u64(7);
    b.iter(|| {
      let key = rng.random_range(0..RANGE);
      black_box(set.insert(key));
      black_box(set.remove(key));
    })
  });
  group.bench_function("contains", |b| {
    let set = SkipSet::new();
    prefill(&set);
    let mut rng = StdRng::seed_from_u64(7);
    b.iter(|| black_box(set.contains(rng.random_range(0..RANGE))))
  });
  group.finish();
}

criterion_group!(benches, bench_read_write, bench_single_thread);
criterion_main!(benches);
