//! Loan management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiJson, ApiPath};
use crate::{
    error::AppResult,
    models::loan::{BorrowBook, Loan},
    AppState,
};

/// Outstanding loans of a member
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Outstanding loans, most recent first", body = Vec<Loan>),
        (status = 400, description = "Invalid member id", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_borrowed_books(
    State(state): State<AppState>,
    ApiPath(member_id): ApiPath<i32>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list_borrowed_books(member_id).await?;
    Ok(Json(loans))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = BorrowBook,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or member not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already checked out", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BorrowBook>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state.services.loans.borrow_book(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Loan),
        (status = 404, description = "Loan not found or already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    ApiPath(loan_id): ApiPath<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.return_book(loan_id).await?;
    Ok(Json(loan))
}
