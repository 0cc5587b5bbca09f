//! Qdrant-backed `VectorIndex` (§4.6 recall). Grounded on the voice-agent
//! codebase's `VectorStore` — same `Qdrant` client builder, same
//! `ensure_collection`/`upsert_points`/`search_points` shape — narrowed to
//! exactly the TM's payload (`en_text`, `fa_text`) and query.

use async_trait::async_trait;
use farsub_core::{Error, Result, VectorHit, VectorIndex};
use qdrant_client::qdrant::{
    value::Kind, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use uuid::Uuid;

pub struct QdrantTmIndex {
    client: Qdrant,
    collection: String,
    vector_dim: u64,
}

impl QdrantTmIndex {
    pub fn connect(url: &str, collection: &str, vector_dim: usize) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| Error::Tm(format!("qdrant connection failed: {e}")))?;
        Ok(Self {
            client,
            collection: collection.to_string(),
            vector_dim: vector_dim as u64,
        })
    }

    pub async fn ensure_collection(&self) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| Error::Tm(format!("collection_exists failed: {e}")))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(self.vector_dim, Distance::Cosine)),
                )
                .await
                .map_err(|e| Error::Tm(format!("create_collection failed: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for QdrantTmIndex {
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding.to_vec(), k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| Error::Tm(format!("search_points failed: {e}")))?;

        let hits = results
            .result
            .into_iter()
            .filter_map(|point| {
                let tm_entry_id = point
                    .id
                    .as_ref()
                    .and_then(|id| id.point_id_options.as_ref())
                    .and_then(|opts| match opts {
                        qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u) => {
                            Uuid::parse_str(u).ok()
                        }
                        _ => None,
                    })?;

                let mut en_text = String::new();
                let mut fa_text = String::new();
                for (k, v) in point.payload {
                    if let Some(Kind::StringValue(s)) = v.kind {
                        match k.as_str() {
                            "en_text" => en_text = s,
                            "fa_text" => fa_text = s,
                            _ => {}
                        }
                    }
                }

                // Qdrant reports similarity directly for cosine-distance
                // collections; the TM's confidence math wants a distance,
                // so invert it back to stay consistent with `VectorHit`'s
                // documented `[0, 2]` cosine-distance contract.
                let distance = 1.0 - point.score;

                Some(VectorHit {
                    tm_entry_id,
                    en_text,
                    fa_text,
                    distance,
                })
            })
            .collect();

        Ok(hits)
    }

    async fn upsert(
        &self,
        tm_entry_id: Uuid,
        embedding: &[f32],
        en_text: &str,
        fa_text: &str,
    ) -> Result<()> {
        let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
        payload.insert("en_text".to_string(), en_text.to_string().into());
        payload.insert("fa_text".to_string(), fa_text.to_string().into());

        let point = PointStruct::new(tm_entry_id.to_string(), embedding.to_vec(), payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]))
            .await
            .map_err(|e| Error::Tm(format!("upsert_points failed: {e}")))?;

        Ok(())
    }
}
