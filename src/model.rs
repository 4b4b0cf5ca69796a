use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::listing_map_link;

/// Status lifecycle: Pending -> Working -> Completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[default]
    Pending,
    Working,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    pub gmap_url: String,
}

/// A stored complaint. Only `status` is mutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject: String,
    pub name: String,
    pub address: String,
    pub description: String,
    pub image_url: String,
    pub location: Option<GeoLocation>,
    pub user_email: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the filing request. The store assigns id, status and
/// creation timestamp.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub subject: String,
    pub name: String,
    pub address: String,
    pub description: String,
    pub image_url: String,
    pub location: Option<GeoLocation>,
    pub user_email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ComplaintStatus,
}

#[derive(Debug, Deserialize)]
pub struct MyComplaintsQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub gmap_url: Option<String>,
}

/// Shape returned by the list-all endpoint: every stored field plus a
/// re-derived map link (null unless both coordinates are present).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject: String,
    pub name: String,
    pub address: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub image_url: String,
    pub location: LocationView,
    pub created_at: DateTime<Utc>,
}

impl From<Complaint> for ComplaintView {
    fn from(c: Complaint) -> Self {
        let location = match c.location {
            Some(loc) => LocationView {
                lat: Some(loc.lat),
                lng: Some(loc.lng),
                gmap_url: Some(listing_map_link(loc.lat, loc.lng)),
            },
            None => LocationView {
                lat: None,
                lng: None,
                gmap_url: None,
            },
        };

        Self {
            id: c.id,
            subject: c.subject,
            name: c.name,
            address: c.address,
            description: c.description,
            status: c.status,
            image_url: c.image_url,
            location,
            created_at: c.created_at,
        }
    }
}
