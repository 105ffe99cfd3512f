use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use paydesk_core::WalletId;
use paydesk_wallet::SupportMessage;

use crate::app::sessions::SessionStore;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(open_session))
        .route("/:id", get(get_session).delete(close_session))
        .route("/:id/deposits", post(deposit))
        .route("/:id/withdrawals", post(withdraw))
        .route("/:id/support", post(submit_support))
}

fn parse_wallet_id(raw: &str) -> Result<WalletId, axum::response::Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

pub async fn open_session(
    Extension(sessions): Extension<Arc<SessionStore>>,
) -> axum::response::Response {
    let snapshot = match sessions.open() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to open wallet session");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "config_error", e.to_string());
        }
    };

    tracing::info!(wallet_id = %snapshot.wallet_id, "wallet session opened");
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "session_id": snapshot.wallet_id.to_string(),
            "wallet": dto::snapshot_to_json(&snapshot),
        })),
    )
        .into_response()
}

pub async fn get_session(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let wallet_id = match parse_wallet_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match sessions.snapshot(wallet_id) {
        Ok(snapshot) => (StatusCode::OK, Json(dto::snapshot_to_json(&snapshot))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn close_session(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let wallet_id = match parse_wallet_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match sessions.close(wallet_id) {
        Ok(()) => {
            tracing::info!(%wallet_id, "wallet session closed");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn deposit(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AmountRequest>, JsonRejection>,
) -> axum::response::Response {
    let wallet_id = match parse_wallet_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let raw = body.raw_amount();

    let outcome = sessions.with_ledger(wallet_id, |ledger| {
        ledger.deposit(&raw).map(|tx| (tx, ledger.balance()))
    });

    match outcome {
        Err(e) => errors::domain_error_to_response(e),
        Ok(Err(e)) => {
            tracing::warn!(%wallet_id, error = %e, "deposit rejected");
            errors::wallet_error_to_response(&e)
        }
        Ok(Ok((tx, balance))) => {
            tracing::info!(
                %wallet_id,
                transaction_id = %tx.id_typed(),
                amount = %tx.amount(),
                "deposit recorded"
            );
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "transaction": dto::transaction_to_json(&tx),
                    "balance": dto::money(balance),
                })),
            )
                .into_response()
        }
    }
}

pub async fn withdraw(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AmountRequest>, JsonRejection>,
) -> axum::response::Response {
    let wallet_id = match parse_wallet_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let raw = body.raw_amount();

    let outcome = sessions.with_ledger(wallet_id, |ledger| {
        ledger
            .withdraw(&raw)
            .map(|tx| (tx, ledger.balance(), ledger.accumulated_fees()))
    });

    match outcome {
        Err(e) => errors::domain_error_to_response(e),
        Ok(Err(e)) => {
            tracing::warn!(%wallet_id, error = %e, "withdrawal rejected");
            errors::wallet_error_to_response(&e)
        }
        Ok(Ok((tx, balance, accumulated_fees))) => {
            let fee = tx.fee().unwrap_or_default();
            tracing::info!(
                %wallet_id,
                transaction_id = %tx.id_typed(),
                amount = %tx.amount(),
                %fee,
                "withdrawal recorded"
            );
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "transaction": dto::transaction_to_json(&tx),
                    "balance": dto::money(balance),
                    "fee": dto::money(fee),
                    "received": dto::money(tx.net_amount()),
                    "accumulated_fees": dto::money(accumulated_fees),
                })),
            )
                .into_response()
        }
    }
}

pub async fn submit_support(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(id): Path<String>,
    body: Result<Json<dto::SupportRequest>, JsonRejection>,
) -> axum::response::Response {
    let wallet_id = match parse_wallet_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    if let Err(e) = sessions.with_ledger(wallet_id, |_| ()) {
        return errors::domain_error_to_response(e);
    }

    let message = match SupportMessage::new(body.message.unwrap_or_default()) {
        Ok(m) => m,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let ack = message.acknowledge(Utc::now());
    tracing::info!(
        %wallet_id,
        ticket_id = %ack.ticket_id,
        length = message.text().len(),
        "support request acknowledged"
    );
    (StatusCode::OK, Json(dto::acknowledgement_to_json(&ack))).into_response()
}
