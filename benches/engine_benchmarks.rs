//! Performance benchmarks for the Leave Entitlement Engine.
//!
//! Covers the hot paths of the engine:
//! - Leave window evaluation over short and long ranges
//! - Request submission and approval against the in-memory store
//! - Annual rollover for workforces of 100 and 1000 employees
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use leave_engine::calendar::{HolidaySet, evaluate_leave_window};
use leave_engine::config::ConfigLoader;
use leave_engine::context::EngineContext;
use leave_engine::engine::{LeaveEngine, NewLeaveRequest};
use leave_engine::external::{Clock, FixedClock, InMemoryDirectory, RecordingNotifier};
use leave_engine::models::{
    BalanceKey, Employee, EmployeeStatus, Gender, LeaveBalance, LeaveType,
};
use leave_engine::store::{InMemoryStore, LeaveStore, UnitOfWork};

fn make_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Builds an engine for `org_bench` with `employee_count` staff, the
/// Bangladesh default rules and a partly used 2025 annual balance each.
async fn create_engine(employee_count: usize) -> LeaveEngine {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let store = Arc::new(InMemoryStore::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let clock = Arc::new(FixedClock::new(
        make_date("2026-01-05").and_hms_opt(9, 0, 0).unwrap(),
    ));

    let mut unit = UnitOfWork::new();
    for i in 0..employee_count {
        let id = format!("emp_{:05}", i);
        directory
            .insert_employee(Employee {
                id: id.clone(),
                organization_id: "org_bench".to_string(),
                gender: if i % 2 == 0 { Gender::Female } else { Gender::Male },
                joining_date: make_date("2022-06-01"),
                status: EmployeeStatus::Active,
                manager_id: None,
            })
            .await;
        let mut previous = LeaveBalance::new(
            BalanceKey::new(id, LeaveType::Annual, 2025),
            Decimal::from(20),
            Decimal::ZERO,
            clock.now(),
        );
        previous.used = Decimal::from((i % 20) as i64);
        unit.insert_balance(previous);
    }
    store.commit(unit).await.expect("Failed to seed balances");

    let ctx = EngineContext::new(store, directory, config)
        .with_notifier(Arc::new(RecordingNotifier::new()))
        .with_clock(clock);
    let engine = LeaveEngine::new(ctx);
    engine
        .catalog()
        .initialize_defaults("org_bench", "bd")
        .await
        .expect("Failed to seed rules");
    engine
}

// =============================================================================
// Leave window evaluation
// =============================================================================

fn bench_leave_window(c: &mut Criterion) {
    let mut holidays = HolidaySet::new();
    holidays.insert(make_date("2026-02-21"), "Language Martyrs' Day");
    holidays.insert(make_date("2026-03-26"), "Independence Day");
    holidays.insert(make_date("2026-04-14"), "Bengali New Year");

    let mut group = c.benchmark_group("leave_window");
    for length in [1u64, 7, 30, 90] {
        let start = make_date("2026-02-01");
        let end = start + Days::new(length - 1);
        group.throughput(Throughput::Elements(length));
        group.bench_with_input(BenchmarkId::new("days", length), &length, |b, _| {
            b.iter(|| evaluate_leave_window(black_box(start), black_box(end), &holidays).unwrap())
        });
    }
    group.finish();
}

// =============================================================================
// Request lifecycle
// =============================================================================

fn bench_submit_and_approve(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let engine = rt.block_on(async {
        let engine = create_engine(1).await;
        let rules = engine.catalog().rules("org_bench").await.unwrap();
        let sick = rules
            .iter()
            .find(|r| r.leave_type == LeaveType::Sick)
            .unwrap();
        engine
            .catalog()
            .assign_rule("emp_00000", &sick.id, Some(Decimal::from(100_000_000)))
            .await
            .unwrap();
        engine
    });

    c.bench_function("submit_and_approve", |b| {
        b.to_async(&rt).iter(|| async {
            let request = engine
                .lifecycle()
                .create(NewLeaveRequest {
                    employee_id: "emp_00000".to_string(),
                    leave_type: LeaveType::Sick,
                    start_date: make_date("2026-01-12"),
                    end_date: make_date("2026-01-13"),
                    half_day: false,
                    half_day_side: None,
                    reason: "flu".to_string(),
                    attachment: None,
                })
                .await
                .unwrap();
            black_box(engine.lifecycle().approve(&request.id, "mgr_bench").await.unwrap())
        })
    });
}

// =============================================================================
// Annual rollover
// =============================================================================

fn bench_rollover(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("rollover");
    group.sample_size(20);
    for count in [100usize, 1000] {
        let engine = rt.block_on(create_engine(count));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("employees", count), &count, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(engine.rollover().run(Some(2026)).await.unwrap()) })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_leave_window, bench_submit_and_approve, bench_rollover);
criterion_main!(benches);
