use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rentbook_core::{
    PaymentService, ReportOptions, ReportService, RoomService, TenantService,
};
use rentbook_domain::{Money, RentBook, Room, Tenant};

fn build_book(rooms: usize, payments_per_tenant: usize) -> RentBook {
    let mut book = RentBook::new("Benchmark");
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    for idx in 0..rooms {
        let rent = Money::from_major(5_000 + (idx as i64 % 10) * 1_000);
        let room = RoomService::add(&mut book, Room::new(format!("{}", idx + 1), "single", rent))
            .expect("add room");
        let tenant = TenantService::add(
            &mut book,
            Tenant::new(format!("Tenant {idx}"), "0700", Some(room), start),
        )
        .expect("add tenant");
        for month in 0..payments_per_tenant {
            let date = start + Duration::days(30 * month as i64 + (idx % 20) as i64);
            let amount = rent + Money::from_major((idx as i64 % 3 - 1) * 500);
            PaymentService::apply_payment(&mut book, tenant, amount, date, None)
                .expect("apply payment");
        }
    }
    book
}

fn bench_reports(c: &mut Criterion) {
    let book = build_book(200, 12);
    let today = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
    let options = ReportOptions::default();

    c.bench_function("dashboard_200_tenants", |b| {
        b.iter(|| black_box(ReportService::dashboard(&book, today, &options)))
    });
    c.bench_function("analytics_200_tenants", |b| {
        b.iter(|| black_box(ReportService::analytics(&book, today)))
    });
}

fn bench_apply_payment(c: &mut Criterion) {
    let book = build_book(50, 24);
    let tenant = book.tenants[0].id;
    let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

    c.bench_function("apply_payment_24_month_history", |b| {
        b.iter_batched(
            || book.clone(),
            |mut book| {
                PaymentService::apply_payment(&mut book, tenant, Money::from_major(5_000), date, None)
                    .expect("apply payment")
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_reports, bench_apply_payment);
criterion_main!(benches);
