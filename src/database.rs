//! Complaint record store.
//!
//! The trait is the seam handlers talk to; the only production implementation
//! is MongoDB. Documents keep their own shape (`ObjectId` ids) and are
//! converted at the boundary so nothing above this module sees BSON types.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client, Collection,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{Complaint, ComplaintStatus, GeoLocation, NewComplaint};

const DEFAULT_DATABASE: &str = "civic_complaints";
const COLLECTION: &str = "complaints";

#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Persists a new record with status `Pending` and a store-assigned
    /// creation timestamp.
    async fn insert(&self, complaint: NewComplaint) -> Result<()>;

    async fn find_all(&self) -> Result<Vec<Complaint>>;

    /// Exact match on the reporter email. Zero matches is an empty vec.
    async fn find_by_email(&self, email: &str) -> Result<Vec<Complaint>>;

    /// Overwrites the status of the record with the given id. Unknown ids are
    /// a no-op; malformed ids are rejected by the caller before this point.
    async fn update_status(&self, id: &ObjectId, status: ComplaintStatus) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComplaintDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    subject: String,
    name: String,
    address: String,
    description: String,
    image_url: String,
    location: Option<GeoLocation>,
    user_email: String,
    status: ComplaintStatus,
    // Kept as a BSON Date so Mongo-side sorts and range queries work.
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<ComplaintDocument> for Complaint {
    fn from(doc: ComplaintDocument) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            subject: doc.subject,
            name: doc.name,
            address: doc.address,
            description: doc.description,
            image_url: doc.image_url,
            location: doc.location,
            user_email: doc.user_email,
            status: doc.status,
            created_at: doc.created_at,
        }
    }
}

pub struct MongoComplaintStore {
    collection: Collection<ComplaintDocument>,
}

impl MongoComplaintStore {
    pub async fn connect(mongo_uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongo_uri)
            .await
            .context("connecting to MongoDB")?;

        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

        info!("Connected to MongoDB database {}", database.name());

        Ok(Self {
            collection: database.collection(COLLECTION),
        })
    }
}

#[async_trait]
impl ComplaintStore for MongoComplaintStore {
    async fn insert(&self, complaint: NewComplaint) -> Result<()> {
        let document = ComplaintDocument {
            id: None,
            subject: complaint.subject,
            name: complaint.name,
            address: complaint.address,
            description: complaint.description,
            image_url: complaint.image_url,
            location: complaint.location,
            user_email: complaint.user_email,
            status: ComplaintStatus::Pending,
            created_at: Utc::now(),
        };

        self.collection
            .insert_one(&document)
            .await
            .context("inserting complaint")?;

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Complaint>> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .context("listing complaints")?;

        let documents: Vec<ComplaintDocument> =
            cursor.try_collect().await.context("reading complaints")?;

        Ok(documents.into_iter().map(Complaint::from).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Complaint>> {
        let cursor = self
            .collection
            .find(doc! { "userEmail": email })
            .await
            .context("listing complaints by email")?;

        let documents: Vec<ComplaintDocument> =
            cursor.try_collect().await.context("reading complaints")?;

        Ok(documents.into_iter().map(Complaint::from).collect())
    }

    async fn update_status(&self, id: &ObjectId, status: ComplaintStatus) -> Result<()> {
        let status = mongodb::bson::to_bson(&status).context("encoding status")?;

        self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": status } })
            .await
            .context("updating complaint status")?;

        Ok(())
    }
}
