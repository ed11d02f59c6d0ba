//! Current user endpoints

use axum::{Extension, Json, extract::State};

use api_types::{Envelope, user::*};
use engine::users;

use crate::{ServerError, server::ServerState};

fn view(model: users::Model) -> UserView {
    UserView {
        subject: model.subject,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        created_at: model.created_at,
    }
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    let user = state.engine.current_user(&user.subject).await?;
    Ok(Json(Envelope::ok(view(user))))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    let user = state
        .engine
        .update_profile(
            &user.subject,
            payload.email.as_deref(),
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
        )
        .await?;
    Ok(Json(Envelope::ok_with_message(
        "Profile updated successfully",
        view(user),
    )))
}
