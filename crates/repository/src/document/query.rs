//! Filter documents for the document backend.

use mongodb::bson::{doc, Bson, Document};

use crate::compose::Composer;
use crate::contract::Criteria;

/// Case-insensitive regex search over dotted field paths.
pub struct DocumentComposer;

impl Composer for DocumentComposer {
    type Predicate = Document;

    fn search(&self, fields: &[String], term: &str) -> Option<Document> {
        if fields.is_empty() {
            return None;
        }

        let pattern = regex::escape(term);
        let clauses: Vec<Document> = fields
            .iter()
            .map(|field| {
                let mut clause = Document::new();
                clause.insert(field.as_str(), doc! { "$regex": pattern.as_str(), "$options": "i" });
                clause
            })
            .collect();

        Some(doc! { "$or": clauses })
    }

    fn and(&self, base: Option<Document>, clause: Document) -> Document {
        match base {
            Some(base) if !base.is_empty() => doc! { "$and": [base, clause] },
            _ => clause,
        }
    }
}

/// Filter document selected by `criteria`.
pub fn criteria_document(criteria: Criteria<Bson, Document>) -> Document {
    match criteria {
        Criteria::Id(id) => doc! { "_id": id },
        Criteria::Ids(ids) => doc! { "_id": { "$in": ids } },
        Criteria::Between(from, to) => doc! { "_id": { "$gte": from, "$lte": to } },
        Criteria::Where(filter) => filter,
    }
}
