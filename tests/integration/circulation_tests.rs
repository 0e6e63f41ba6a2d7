//! Database-backed circulation tests
//!
//! Each test gets a fresh database with the repository migrations applied.
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use circulation_server::{
    config::CirculationConfig,
    error::AppError,
    models::{
        book::CreateBook,
        catalog::ContainerKind,
        loan::{CreateLoan, UpdateLoan},
        status::{CatalogStatus, CopyStatus, LoanStatus, PenaltyType},
    },
    repository::Repository,
    services::Services,
};

struct Fixture {
    services: Services,
    member_id: Uuid,
    member_id_number: String,
    employee_id: Uuid,
}

async fn setup(pool: &PgPool) -> Fixture {
    let member_id = Uuid::new_v4();
    let employee_id = Uuid::new_v4();
    let member_id_number = "12345678901".to_string();

    sqlx::query("INSERT INTO members (id, id_number, name) VALUES ($1, $2, 'Ada Member')")
        .bind(member_id)
        .bind(&member_id_number)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO employees (id, name) VALUES ($1, 'Desk Employee')")
        .bind(employee_id)
        .execute(pool)
        .await
        .unwrap();

    let services = Services::new(Repository::new(pool.clone()), &CirculationConfig::default());

    Fixture {
        services,
        member_id,
        member_id_number,
        employee_id,
    }
}

async fn insert_location(pool: &PgPool) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO locations (section_code, aisle_code, shelf_number) VALUES ('A', '1', '1') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_author(pool: &PgPool) -> i64 {
    sqlx::query_scalar("INSERT INTO authors (full_name) VALUES ('Homer') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_publisher(pool: &PgPool) -> i64 {
    sqlx::query_scalar("INSERT INTO publishers (name) VALUES ('Penguin') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_category(pool: &PgPool) -> i16 {
    sqlx::query_scalar("INSERT INTO categories (name) VALUES ('Fiction') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_subcategory(pool: &PgPool, category_id: i16) -> i16 {
    sqlx::query_scalar(
        "INSERT INTO subcategories (category_id, name) VALUES ($1, 'Epic') RETURNING id",
    )
    .bind(category_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn book_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn new_book(isbn: &str, copy_count: i16) -> CreateBook {
    CreateBook {
        isbn: isbn.to_string(),
        title: "The Odyssey".to_string(),
        page_count: 541,
        publishing_year: -700,
        description: None,
        print_count: Some(1),
        copy_count,
        publisher_id: None,
        location_id: None,
        author_ids: vec![],
        language_ids: vec![],
        subcategory_ids: vec![],
    }
}

async fn first_copy_id(pool: &PgPool, book_id: i64) -> i64 {
    sqlx::query_scalar("SELECT id FROM book_copies WHERE book_id = $1 ORDER BY id LIMIT 1")
        .bind(book_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn lend(fx: &Fixture, copy_id: i64, day_count: i16) -> Result<i64, AppError> {
    let loan = fx
        .services
        .loans
        .create_loan(
            CreateLoan {
                book_copy_id: copy_id,
                member_id_number: fx.member_id_number.clone(),
                day_count,
            },
            fx.employee_id,
        )
        .await?;
    Ok(loan.id)
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_copies_are_conserved_across_adjustments(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 4)).await.unwrap();
    assert_eq!(book.copies.active, 4);

    let copy_id = first_copy_id(&pool, book.book.id).await;
    lend(&fx, copy_id, 14).await.unwrap();

    fx.services.inventory.adjust_copies(book.book.id, 3).await.unwrap();
    let report = fx.services.inventory.adjust_copies(book.book.id, -2).await.unwrap();

    assert_eq!(report.retired, 2);
    assert_eq!(report.copies.total(), 4 + 3);
    assert_eq!(report.copies.active, 4);
    assert_eq!(report.copies.borrowed, 1);
    assert_eq!(report.copies.inactive, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_retiring_more_than_active_changes_nothing(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 3)).await.unwrap();

    let err = fx.services.inventory.adjust_copies(book.book.id, -5).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let after = fx.services.inventory.get_book(book.book.id).await.unwrap();
    assert_eq!(after.copies.active, 3);
    assert_eq!(after.copies.inactive, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_full_location_rejects_new_book(pool: PgPool) {
    let fx = setup(&pool).await;
    let location_id = insert_location(&pool).await;

    let mut first = new_book("9780140449136", 50);
    first.location_id = Some(location_id);
    fx.services.inventory.create_book(first).await.unwrap();

    let mut second = new_book("9780140449137", 1);
    second.location_id = Some(location_id);
    let err = fx.services.inventory.create_book(second).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let persisted: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = '9780140449137')")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!persisted);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_unknown_location_is_not_found(pool: PgPool) {
    let fx = setup(&pool).await;
    let mut book = new_book("9780140449136", 1);
    book.location_id = Some(999);

    let err = fx.services.inventory.create_book(book).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_duplicate_isbn_is_conflict(pool: PgPool) {
    let fx = setup(&pool).await;
    fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();

    let err = fx
        .services
        .inventory
        .create_book(new_book("9780140449136", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_copy_can_only_be_lent_once(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;

    lend(&fx, copy_id, 14).await.unwrap();
    let err = lend(&fx, copy_id, 14).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let open: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM loans WHERE book_copy_id = $1 AND status = 'Borrowed'",
    )
    .bind(copy_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(open, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_concurrent_loans_on_one_copy(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;

    let (a, b) = tokio::join!(lend(&fx, copy_id, 7), lend(&fx, copy_id, 7));
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_unknown_member_or_copy(pool: PgPool) {
    let fx = setup(&pool).await;

    let err = lend(&fx, 424242, 7).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = fx
        .services
        .loans
        .create_loan(
            CreateLoan {
                book_copy_id: 1,
                member_id_number: "00000000000".to_string(),
                day_count: 7,
            },
            fx.employee_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_return_releases_copy_and_records_transaction(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;
    let loan_id = lend(&fx, copy_id, 14).await.unwrap();

    // No audit row on creation
    let err = fx.services.loans.get_transactions(loan_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let outcome = fx.services.loans.return_book(loan_id).await.unwrap();
    assert_eq!(outcome.loan.status, LoanStatus::Returned);
    assert!(outcome.loan.return_date.is_some());
    assert!(outcome.penalty.is_none());

    let copies = fx.services.inventory.list_copies(book.book.id).await.unwrap();
    assert_eq!(copies[0].status, CopyStatus::Active);

    let transactions = fx.services.loans.get_transactions(loan_id).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].status, LoanStatus::Returned);
    assert_eq!(transactions[0].employee_id, fx.employee_id);

    // Returning twice is rejected and changes nothing
    let err = fx.services.loans.return_book(loan_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(fx.services.loans.get_transactions(loan_id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_late_return_creates_penalty(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;
    let loan_id = lend(&fx, copy_id, 14).await.unwrap();

    sqlx::query("UPDATE loans SET due_date = $2 WHERE id = $1")
        .bind(loan_id)
        .bind(Utc::now() - Duration::days(11) - Duration::hours(1))
        .execute(&pool)
        .await
        .unwrap();

    let outcome = fx.services.loans.return_book(loan_id).await.unwrap();
    let penalty = outcome.penalty.expect("late return should be penalized");
    assert_eq!(penalty.penalty_type, PenaltyType::TenDays);
    assert_eq!(penalty.overdue_days, 11);
    assert_eq!(penalty.total_fee, Decimal::new(550, 2));
    assert_eq!(penalty.member_id, fx.member_id);

    let penalties = fx.services.penalties.get_member_penalties(fx.member_id).await.unwrap();
    assert_eq!(penalties.len(), 1);
    assert_eq!(penalties[0].member_name.as_deref(), Some("Ada Member"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_return_within_grace_window_has_no_penalty(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;
    let loan_id = lend(&fx, copy_id, 14).await.unwrap();

    sqlx::query("UPDATE loans SET due_date = $2 WHERE id = $1")
        .bind(loan_id)
        .bind(Utc::now() - Duration::days(6))
        .execute(&pool)
        .await
        .unwrap();

    let outcome = fx.services.loans.return_book(loan_id).await.unwrap();
    assert!(outcome.penalty.is_none());
    assert!(fx
        .services
        .penalties
        .get_member_penalties(fx.member_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_update_loan_writes_audit_and_guards_returned(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;
    let loan_id = lend(&fx, copy_id, 14).await.unwrap();

    let loan = fx
        .services
        .loans
        .update_loan(loan_id, UpdateLoan { status: LoanStatus::Lost }, fx.employee_id)
        .await
        .unwrap();
    assert_eq!(loan.status, LoanStatus::Lost);

    // Returned is only accepted from Borrowed
    let err = fx
        .services
        .loans
        .update_loan(loan_id, UpdateLoan { status: LoanStatus::Returned }, fx.employee_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let transactions = fx.services.loans.get_transactions(loan_id).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].employee_name.as_deref(), Some("Desk Employee"));

    let err = fx
        .services
        .loans
        .update_loan(loan_id, UpdateLoan { status: LoanStatus::Damaged }, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_cascade_is_idempotent(pool: PgPool) {
    let fx = setup(&pool).await;
    let author_id = insert_author(&pool).await;
    let mut request = new_book("9780140449136", 2);
    request.author_ids = vec![author_id];
    let book = fx.services.inventory.create_book(request).await.unwrap();

    let report = fx
        .services
        .cascade
        .set_container_status(ContainerKind::Author, author_id, CatalogStatus::InActive)
        .await
        .unwrap();
    assert_eq!(report.books_updated, 1);
    let after = fx.services.inventory.get_book(book.book.id).await.unwrap();
    assert_eq!(after.book.status, CatalogStatus::InActive);
    // Copies are left alone by container cascades
    assert_eq!(after.copies.active, 2);

    let once = fx
        .services
        .cascade
        .set_container_status(ContainerKind::Author, author_id, CatalogStatus::Active)
        .await
        .unwrap();
    let twice = fx
        .services
        .cascade
        .set_container_status(ContainerKind::Author, author_id, CatalogStatus::Active)
        .await
        .unwrap();
    assert_eq!(once.books_updated, 1);
    assert_eq!(twice.books_updated, 0);
    let after = fx.services.inventory.get_book(book.book.id).await.unwrap();
    assert_eq!(after.book.status, CatalogStatus::Active);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_most_restrictive_owner_wins(pool: PgPool) {
    let fx = setup(&pool).await;
    let author_id = insert_author(&pool).await;
    let publisher_id = insert_publisher(&pool).await;
    let mut request = new_book("9780140449136", 1);
    request.author_ids = vec![author_id];
    request.publisher_id = Some(publisher_id);
    let book = fx.services.inventory.create_book(request).await.unwrap();

    fx.services
        .cascade
        .set_container_status(ContainerKind::Publisher, publisher_id, CatalogStatus::Banned)
        .await
        .unwrap();
    fx.services
        .cascade
        .set_container_status(ContainerKind::Author, author_id, CatalogStatus::Active)
        .await
        .unwrap();

    let after = fx.services.inventory.get_book(book.book.id).await.unwrap();
    assert_eq!(after.book.status, CatalogStatus::Banned);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_publisher_with_active_books_cannot_be_deactivated(pool: PgPool) {
    let fx = setup(&pool).await;
    let publisher_id = insert_publisher(&pool).await;
    let mut request = new_book("9780140449136", 1);
    request.publisher_id = Some(publisher_id);
    fx.services.inventory.create_book(request).await.unwrap();

    let err = fx
        .services
        .cascade
        .set_container_status(ContainerKind::Publisher, publisher_id, CatalogStatus::InActive)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let row = fx
        .services
        .cascade
        .get_container(ContainerKind::Publisher, publisher_id)
        .await
        .unwrap();
    assert_eq!(row.status, CatalogStatus::Active);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_banning_book_relabels_borrowed_copy(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 2)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;
    let loan_id = lend(&fx, copy_id, 14).await.unwrap();

    let report = fx
        .services
        .cascade
        .set_book_status(book.book.id, CatalogStatus::Banned)
        .await
        .unwrap();
    assert_eq!(report.copies_updated, 2);

    // The loan stays open and returning it keeps the copy banned
    fx.services.loans.return_book(loan_id).await.unwrap();
    let copies = fx.services.inventory.list_copies(book.book.id).await.unwrap();
    assert!(copies.iter().all(|c| c.status == CopyStatus::Banned));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_unknown_references_are_not_found(pool: PgPool) {
    let fx = setup(&pool).await;

    let mut request = new_book("9780140449136", 1);
    request.publisher_id = Some(999);
    let err = fx.services.inventory.create_book(request).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Publisher not found"));

    let mut request = new_book("9780140449136", 1);
    request.author_ids = vec![999];
    let err = fx.services.inventory.create_book(request).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Author not found"));

    let mut request = new_book("9780140449136", 1);
    request.language_ids = vec![999];
    let err = fx.services.inventory.create_book(request).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Language not found"));

    let mut request = new_book("9780140449136", 1);
    request.subcategory_ids = vec![999];
    let err = fx.services.inventory.create_book(request).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Subcategory not found"));

    // Nothing from the failed inserts survives
    assert_eq!(book_count(&pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_category_cascades_through_subcategories(pool: PgPool) {
    let fx = setup(&pool).await;
    let category_id = insert_category(&pool).await;
    let subcategory_id = insert_subcategory(&pool, category_id).await;
    let mut request = new_book("9780140449136", 2);
    request.subcategory_ids = vec![subcategory_id];
    let book = fx.services.inventory.create_book(request).await.unwrap();

    let report = fx
        .services
        .cascade
        .set_container_status(ContainerKind::Category, i64::from(category_id), CatalogStatus::Banned)
        .await
        .unwrap();
    assert_eq!(report.subcategories_updated, 1);
    assert_eq!(report.books_updated, 1);

    let subcategory = fx
        .services
        .cascade
        .get_container(ContainerKind::Subcategory, i64::from(subcategory_id))
        .await
        .unwrap();
    assert_eq!(subcategory.status, CatalogStatus::Banned);

    let after = fx.services.inventory.get_book(book.book.id).await.unwrap();
    assert_eq!(after.book.status, CatalogStatus::Banned);
    assert_eq!(after.copies.active, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_book_follows_most_restrictive_subcategory(pool: PgPool) {
    let fx = setup(&pool).await;
    let category_id = insert_category(&pool).await;
    let epic = insert_subcategory(&pool, category_id).await;
    let tragedy = insert_subcategory(&pool, category_id).await;
    let mut request = new_book("9780140449136", 1);
    request.subcategory_ids = vec![epic, tragedy];
    let book = fx.services.inventory.create_book(request).await.unwrap();

    let cascade = &fx.services.cascade;
    cascade
        .set_container_status(ContainerKind::Subcategory, i64::from(tragedy), CatalogStatus::Banned)
        .await
        .unwrap();
    let report = cascade
        .set_container_status(ContainerKind::Subcategory, i64::from(epic), CatalogStatus::Active)
        .await
        .unwrap();
    assert_eq!(report.books_updated, 0);
    let after = fx.services.inventory.get_book(book.book.id).await.unwrap();
    assert_eq!(after.book.status, CatalogStatus::Banned);

    cascade
        .set_container_status(ContainerKind::Subcategory, i64::from(epic), CatalogStatus::InActive)
        .await
        .unwrap();
    let report = cascade
        .set_container_status(ContainerKind::Subcategory, i64::from(tragedy), CatalogStatus::Active)
        .await
        .unwrap();
    assert_eq!(report.books_updated, 1);
    let after = fx.services.inventory.get_book(book.book.id).await.unwrap();
    assert_eq!(after.book.status, CatalogStatus::InActive);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_unknown_container_is_not_found(pool: PgPool) {
    let fx = setup(&pool).await;

    let err = fx
        .services
        .cascade
        .set_container_status(ContainerKind::Author, 999, CatalogStatus::Banned)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = fx
        .services
        .cascade
        .set_book_status(999, CatalogStatus::Banned)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_stale_write_is_concurrency_conflict(pool: PgPool) {
    let fx = setup(&pool).await;
    let repository = Repository::new(pool.clone());
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();

    let stale = repository.books.get_by_id(book.book.id).await.unwrap();
    fx.services
        .cascade
        .set_book_status(book.book.id, CatalogStatus::InActive)
        .await
        .unwrap();

    let mut tx = repository.begin().await.unwrap();
    let err = repository
        .books
        .update_status(&mut tx, &stale, CatalogStatus::Banned)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Concurrency(_)));
    drop(tx);

    let author_id = insert_author(&pool).await;
    let stale = repository.catalog.get(ContainerKind::Author, author_id).await.unwrap();
    fx.services
        .cascade
        .set_container_status(ContainerKind::Author, author_id, CatalogStatus::InActive)
        .await
        .unwrap();

    let mut tx = repository.begin().await.unwrap();
    let err = repository
        .catalog
        .update_status(&mut tx, ContainerKind::Author, &stale, CatalogStatus::Banned)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Concurrency(_)));
    drop(tx);

    // A row deleted under a writer is reported as missing, not as a race
    sqlx::query("DELETE FROM authors WHERE id = $1")
        .bind(author_id)
        .execute(&pool)
        .await
        .unwrap();
    let mut tx = repository.begin().await.unwrap();
    let err = repository
        .catalog
        .update_status(&mut tx, ContainerKind::Author, &stale, CatalogStatus::Banned)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_lost_loan_can_be_reopened(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;
    let loan_id = lend(&fx, copy_id, 14).await.unwrap();

    let loans = &fx.services.loans;
    loans
        .update_loan(loan_id, UpdateLoan { status: LoanStatus::Lost }, fx.employee_id)
        .await
        .unwrap();
    let loan = loans
        .update_loan(loan_id, UpdateLoan { status: LoanStatus::Borrowed }, fx.employee_id)
        .await
        .unwrap();
    assert_eq!(loan.status, LoanStatus::Borrowed);
    assert_eq!(loans.get_transactions(loan_id).await.unwrap().len(), 2);

    loans.return_book(loan_id).await.unwrap();
    let copies = fx.services.inventory.list_copies(book.book.id).await.unwrap();
    assert_eq!(copies[0].status, CopyStatus::Active);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_reopening_conflicts_with_another_open_loan(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;
    let first = lend(&fx, copy_id, 14).await.unwrap();

    fx.services
        .loans
        .update_loan(first, UpdateLoan { status: LoanStatus::Lost }, fx.employee_id)
        .await
        .unwrap();

    // The copy turns up and goes out again
    sqlx::query("UPDATE book_copies SET status = 'Active' WHERE id = $1")
        .bind(copy_id)
        .execute(&pool)
        .await
        .unwrap();
    lend(&fx, copy_id, 14).await.unwrap();

    let err = fx
        .services
        .loans
        .update_loan(first, UpdateLoan { status: LoanStatus::Borrowed }, fx.employee_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let transactions = fx.services.loans.get_transactions(first).await.unwrap();
    assert_eq!(transactions.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_overlong_loan_status_is_rejected(pool: PgPool) {
    let fx = setup(&pool).await;
    let book = fx.services.inventory.create_book(new_book("9780140449136", 1)).await.unwrap();
    let copy_id = first_copy_id(&pool, book.book.id).await;
    let loan_id = lend(&fx, copy_id, 14).await.unwrap();

    let status = LoanStatus::Other("AwaitingInspectionAtBranch".to_string());
    let err = fx
        .services
        .loans
        .update_loan(loan_id, UpdateLoan { status }, fx.employee_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let loan = fx.services.loans.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Borrowed);
}
