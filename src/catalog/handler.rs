//! HTTP handlers for the book catalog API.
//!
//! The contract here is unusual on purpose: validation and lookup failures
//! are reported as a success status with a bare text body (see
//! [`CatalogError`]'s `IntoResponse`), because that is what the clients of
//! the original service expect. Only store faults become real HTTP errors.

use axum::{
    Json,
    extract::{Path, State},
};

use super::{Book, BookSummary, Catalog, CreateBook, CreateComment, CreatedBook};
use crate::error::CatalogError;
use crate::handler::AppState;

pub async fn list_books(
    State(state): State<AppState>,
) -> Result<Json<Vec<BookSummary>>, CatalogError> {
    let catalog = Catalog::new(state.db.connection());
    let books = catalog.list_books().await?;

    tracing::info!(count = books.len(), "listed books");
    Ok(Json(books))
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: Option<Json<CreateBook>>,
) -> Result<Json<CreatedBook>, CatalogError> {
    // Only the empty string is rejected; a purely-whitespace title is a
    // valid title. No trimming happens anywhere on this path.
    let title = payload
        .and_then(|Json(p)| p.title)
        .filter(|t| !t.is_empty())
        .ok_or(CatalogError::MissingField("title"))?;

    let catalog = Catalog::new(state.db.connection());
    let book = catalog.create_book(&title).await?;

    tracing::info!(id = book.id, "created book");
    Ok(Json(CreatedBook {
        id: book.id,
        title: book.title,
    }))
}

pub async fn delete_all_books(
    State(state): State<AppState>,
) -> Result<&'static str, CatalogError> {
    let catalog = Catalog::new(state.db.connection());
    let removed = catalog.delete_all_books().await?;

    tracing::info!(removed, "deleted all books");
    Ok("complete delete successful")
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, CatalogError> {
    let id = Catalog::parse_id(&id)?;

    let catalog = Catalog::new(state.db.connection());
    let book = catalog
        .get_book(id)
        .await?
        .ok_or(CatalogError::NoBookExists)?;

    Ok(Json(book))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<CreateComment>>,
) -> Result<Json<Book>, CatalogError> {
    // The comment is validated before the id is even looked at.
    let comment = payload
        .and_then(|Json(p)| p.comment)
        .filter(|c| !c.is_empty())
        .ok_or(CatalogError::MissingField("comment"))?;

    // Unlike GET, this endpoint reports a malformed id as a plain miss.
    let id = Catalog::parse_id(&id).map_err(|_| CatalogError::NoBookExists)?;

    let catalog = Catalog::new(state.db.connection());
    let book = catalog
        .append_comment(id, &comment)
        .await?
        .ok_or(CatalogError::NoBookExists)?;

    tracing::info!(id = book.id, "appended comment");
    Ok(Json(book))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<&'static str, CatalogError> {
    let id = Catalog::parse_id(&id).map_err(|_| CatalogError::NoBookExists)?;

    let catalog = Catalog::new(state.db.connection());
    if !catalog.delete_book(id).await? {
        return Err(CatalogError::NoBookExists);
    }

    tracing::info!(id, "deleted book");
    Ok("delete successful")
}
