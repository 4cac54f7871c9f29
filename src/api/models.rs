use serde::{Deserialize, Serialize};

/// A business as returned by `GET /businesses`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Business {
	/// Backend identifier, used in the relationships path.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Free-form category, e.g. `Technology`.
	pub category: String,
}

/// One outbound link of a business. `id`, `name` and `category` describe the
/// business on the other end; `kind` and `transaction_volume` describe the link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
	/// Id of the related business.
	pub id: String,
	/// Relationship type, sent as `type`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Volume of trade along the link.
	pub transaction_volume: f64,
	/// Name of the related business.
	pub name: String,
	/// Category of the related business.
	pub category: String,
}

/// Body of `GET /businesses/{id}/relationships`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessRelationships {
	/// Id of the subject business.
	pub id: String,
	/// Name of the subject business.
	pub name: String,
	/// Category of the subject business.
	pub category: String,
	/// Outbound links; missing in the body means none.
	#[serde(default)]
	pub relationships: Vec<Relationship>,
}

impl BusinessRelationships {
	/// The subject business without its relationships.
	pub fn subject(&self) -> Business {
		Business {
			id: self.id.clone(),
			name: self.name.clone(),
			category: self.category.clone(),
		}
	}
}
