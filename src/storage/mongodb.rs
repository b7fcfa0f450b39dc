//! MongoDB implementation of the alert history log.

use async_trait::async_trait;
use mongodb::bson::{doc, to_bson, Document};
use mongodb::{Client, Database};

use crate::alert::AlertRecord;
use crate::interfaces::{AlertLog, Result, WINDOW_CAP};

/// Document discriminator; the per-chain collections hold alerts only.
const ALERT_DOC_TYPE: &str = "alert";

/// MongoDB implementation of `AlertLog`.
///
/// One collection per chain scope; each document batches up to `WINDOW_CAP`
/// alerts with running first/last timestamps and a count, so dashboards can
/// aggregate without unwinding the full history.
pub struct MongoAlertLog {
    database: Database,
}

impl MongoAlertLog {
    pub fn new(client: &Client, database_name: &str) -> Self {
        Self {
            database: client.database(database_name),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

#[async_trait]
impl AlertLog for MongoAlertLog {
    async fn append(&self, scope: &str, record: AlertRecord) -> Result<()> {
        let collection = self.database.collection::<Document>(scope);
        let entry = to_bson(&record)?;

        // Single server-side conditional update keeps concurrent appends
        // from losing records: push into the document that still has room,
        // folding the timestamp into the first/last bounds.
        let filter = doc! {
            "doc_type": ALERT_DOC_TYPE,
            "n_alerts": { "$lt": WINDOW_CAP as i32 },
        };
        let update = doc! {
            "$push": { "alerts": entry.clone() },
            "$min": { "first": record.timestamp },
            "$max": { "last": record.timestamp },
            "$inc": { "n_alerts": 1 },
        };

        let result = collection.update_one(filter, update).await?;

        // No open window: either the scope has no documents yet or the
        // current one is full. Start a fresh window with this record.
        if result.matched_count == 0 {
            collection
                .insert_one(doc! {
                    "doc_type": ALERT_DOC_TYPE,
                    "alerts": [entry],
                    "first": record.timestamp,
                    "last": record.timestamp,
                    "n_alerts": 1,
                })
                .await?;
        }

        Ok(())
    }
}
