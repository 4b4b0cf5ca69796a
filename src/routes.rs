use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use tracing::info;

use crate::{
    error::AppError,
    model::{
        ComplaintView, GeoLocation, MyComplaintsQuery, NewComplaint, SpeakRequest,
        UpdateStatusRequest,
    },
    state::AppState,
    utils::{filing_map_link, unique_filename},
};

pub async fn health_handler() -> &'static str {
    "Civic complaints backend is running"
}

#[derive(Default)]
struct ComplaintForm {
    subject: String,
    name: String,
    address: String,
    description: String,
    lat: String,
    lng: String,
    user_email: String,
    image: Option<(String, Bytes)>,
}

impl ComplaintForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| AppError::MalformedPayload)?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "image".to_string());
                let bytes = field.bytes().await.map_err(|_| AppError::MalformedPayload)?;
                form.image = Some((filename, bytes));
                continue;
            }

            let value = field.text().await.map_err(|_| AppError::MalformedPayload)?;
            match name.as_str() {
                "subject" => form.subject = value,
                "name" => form.name = value,
                "address" => form.address = value,
                "description" => form.description = value,
                "lat" => form.lat = value,
                "lng" => form.lng = value,
                "userEmail" => form.user_email = value,
                _ => {}
            }
        }

        Ok(form)
    }

    /// Location is kept only when both coordinates parse; the map link keeps
    /// the raw form values.
    fn location(&self) -> Option<GeoLocation> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lng.trim().parse::<f64>().ok()?;

        Some(GeoLocation {
            lat,
            lng,
            gmap_url: filing_map_link(self.lat.trim(), self.lng.trim()),
        })
    }
}

pub async fn file_complaint_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = ComplaintForm::read(multipart).await?;

    if form.user_email.trim().is_empty() {
        return Err(AppError::MissingEmail);
    }

    let image_url = match &form.image {
        Some((original_name, bytes)) => {
            let filename = unique_filename(original_name);
            state.media.store(&filename, bytes.clone()).await?
        }
        None => String::new(),
    };

    let location = form.location();

    state
        .store
        .insert(NewComplaint {
            subject: form.subject,
            name: form.name,
            address: form.address,
            description: form.description,
            image_url,
            location,
            user_email: form.user_email.clone(),
        })
        .await?;

    info!(user_email = %form.user_email, "Complaint filed");

    Ok(Json(json!({ "message": "Complaint filed successfully" })))
}

pub async fn all_complaints_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let complaints = state.store.find_all().await?;

    let views: Vec<ComplaintView> = complaints.into_iter().map(ComplaintView::from).collect();

    Ok(Json(views))
}

pub async fn my_complaints_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MyComplaintsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = query.email.ok_or(AppError::MalformedPayload)?;

    let complaints = state.store.find_by_email(&email).await?;

    Ok(Json(complaints))
}

pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = ObjectId::parse_str(&id).map_err(|_| AppError::MalformedPayload)?;

    state.store.update_status(&id, request.status).await?;

    info!(id = %id, status = ?request.status, "Complaint status updated");

    Ok(Json(json!({ "message": "Status updated successfully" })))
}

pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeakRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::EmptyText);
    }

    let audio = state.speech.synthesize(&request.text).await?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}
