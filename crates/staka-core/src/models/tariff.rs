use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A purchasable correction tier, as stored.
///
/// This type is deliberately not `Serialize`: it carries the Stripe product and
/// price identifiers, which only the admin write path may see. Public output goes
/// through [`PublicTariff`], admin output through [`AdminTariff`].
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tariff {
    pub id: Uuid,
    pub nom: String,
    pub description: String,
    /// Price in euro cents
    pub prix: i32,
    pub prix_formate: String,
    pub type_service: String,
    pub duree_estimee: String,
    pub actif: bool,
    pub ordre: i32,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Stripe identifiers are left out so a stray `?tariff` in a log line cannot leak them.
impl fmt::Debug for Tariff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tariff")
            .field("id", &self.id)
            .field("nom", &self.nom)
            .field("prix", &self.prix)
            .field("actif", &self.actif)
            .field("ordre", &self.ordre)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl Tariff {
    /// Apply a partial update, recomputing the formatted price when the price changes.
    pub fn apply(&mut self, patch: UpdateTariffRequest, now: DateTime<Utc>) {
        if let Some(nom) = patch.nom {
            self.nom = nom;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(prix) = patch.prix {
            self.prix = prix;
            self.prix_formate = format_price(prix);
        }
        if let Some(type_service) = patch.type_service {
            self.type_service = type_service;
        }
        if let Some(duree_estimee) = patch.duree_estimee {
            self.duree_estimee = duree_estimee;
        }
        if let Some(actif) = patch.actif {
            self.actif = actif;
        }
        if let Some(ordre) = patch.ordre {
            self.ordre = ordre;
        }
        if let Some(stripe_product_id) = patch.stripe_product_id {
            self.stripe_product_id = Some(stripe_product_id).filter(|s| !s.is_empty());
        }
        if let Some(stripe_price_id) = patch.stripe_price_id {
            self.stripe_price_id = Some(stripe_price_id).filter(|s| !s.is_empty());
        }
        self.updated_at = now;
    }

    /// Display sort key: `(ordre, created_at)` ascending.
    pub fn sort_key(&self) -> (i32, DateTime<Utc>) {
        (self.ordre, self.created_at)
    }
}

/// The public view of a tariff.
///
/// Every field here is an explicit allow-list entry. Fields added to [`Tariff`]
/// stay private until they are added to this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PublicTariff {
    pub id: Uuid,
    pub nom: String,
    pub description: String,
    pub prix: i32,
    pub prix_formate: String,
    pub type_service: String,
    pub duree_estimee: String,
    pub actif: bool,
    pub ordre: i32,
    pub created_at: DateTime<Utc>,
}

impl PublicTariff {
    pub fn sort_key(&self) -> (i32, DateTime<Utc>) {
        (self.ordre, self.created_at)
    }
}

impl From<&Tariff> for PublicTariff {
    fn from(tariff: &Tariff) -> Self {
        Self {
            id: tariff.id,
            nom: tariff.nom.clone(),
            description: tariff.description.clone(),
            prix: tariff.prix,
            prix_formate: tariff.prix_formate.clone(),
            type_service: tariff.type_service.clone(),
            duree_estimee: tariff.duree_estimee.clone(),
            actif: tariff.actif,
            ordre: tariff.ordre,
            created_at: tariff.created_at,
        }
    }
}

/// Admin view of a tariff, including the Stripe references.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminTariff {
    pub id: Uuid,
    pub nom: String,
    pub description: String,
    pub prix: i32,
    pub prix_formate: String,
    pub type_service: String,
    pub duree_estimee: String,
    pub actif: bool,
    pub ordre: i32,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tariff> for AdminTariff {
    fn from(tariff: Tariff) -> Self {
        Self {
            id: tariff.id,
            nom: tariff.nom,
            description: tariff.description,
            prix: tariff.prix,
            prix_formate: tariff.prix_formate,
            type_service: tariff.type_service,
            duree_estimee: tariff.duree_estimee,
            actif: tariff.actif,
            ordre: tariff.ordre,
            stripe_product_id: tariff.stripe_product_id,
            stripe_price_id: tariff.stripe_price_id,
            created_at: tariff.created_at,
            updated_at: tariff.updated_at,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Request body for creating a tariff
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTariffRequest {
    #[validate(length(min = 1, max = 255))]
    pub nom: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub prix: i32,
    #[validate(length(min = 1, max = 100))]
    pub type_service: String,
    #[validate(length(min = 1, max = 100))]
    pub duree_estimee: String,
    #[serde(default = "default_true")]
    pub actif: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub ordre: i32,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
}

/// Request body for a partial tariff update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTariffRequest {
    #[validate(length(min = 1, max = 255))]
    pub nom: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub prix: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub type_service: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub duree_estimee: Option<String>,
    pub actif: Option<bool>,
    #[validate(range(min = 0))]
    pub ordre: Option<i32>,
    /// Empty string clears the reference
    pub stripe_product_id: Option<String>,
    /// Empty string clears the reference
    pub stripe_price_id: Option<String>,
}

/// A validated tariff ready to be inserted
#[derive(Debug, Clone)]
pub struct NewTariff {
    pub nom: String,
    pub description: String,
    pub prix: i32,
    pub prix_formate: String,
    pub type_service: String,
    pub duree_estimee: String,
    pub actif: bool,
    pub ordre: i32,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
}

impl From<CreateTariffRequest> for NewTariff {
    fn from(req: CreateTariffRequest) -> Self {
        Self {
            prix_formate: format_price(req.prix),
            nom: req.nom,
            description: req.description,
            prix: req.prix,
            type_service: req.type_service,
            duree_estimee: req.duree_estimee,
            actif: req.actif,
            ordre: req.ordre,
            stripe_product_id: req.stripe_product_id.filter(|s| !s.is_empty()),
            stripe_price_id: req.stripe_price_id.filter(|s| !s.is_empty()),
        }
    }
}

/// Format a price in cents for display, e.g. `1999` -> `"19,99€"`, `150000` -> `"1500€"`.
pub fn format_price(cents: i32) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let (euros, rest) = (abs / 100, abs % 100);
    if rest == 0 {
        format!("{}{}€", sign, euros)
    } else {
        format!("{}{},{:02}€", sign, euros, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tariff() -> Tariff {
        let now = Utc::now();
        Tariff {
            id: Uuid::new_v4(),
            nom: "Correction Standard".to_string(),
            description: "Correction orthographique et grammaticale".to_string(),
            prix: 200,
            prix_formate: "2€".to_string(),
            type_service: "Correction".to_string(),
            duree_estimee: "7-10 jours".to_string(),
            actif: true,
            ordre: 1,
            stripe_product_id: Some("prod_secret123".to_string()),
            stripe_price_id: Some("price_secret456".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0), "0€");
        assert_eq!(format_price(200), "2€");
        assert_eq!(format_price(1999), "19,99€");
        assert_eq!(format_price(150000), "1500€");
        assert_eq!(format_price(1505), "15,05€");
    }

    #[test]
    fn test_debug_output_redacts_stripe_ids() {
        let debug = format!("{:?}", sample_tariff());
        assert!(!debug.contains("prod_secret123"));
        assert!(!debug.contains("price_secret456"));
        assert!(debug.contains("Correction Standard"));
    }

    #[test]
    fn test_public_tariff_serializes_only_allow_listed_fields() {
        let public = PublicTariff::from(&sample_tariff());
        let value = serde_json::to_value(&public).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "actif",
                "createdAt",
                "description",
                "dureeEstimee",
                "id",
                "nom",
                "ordre",
                "prix",
                "prixFormate",
                "typeService",
            ]
        );
        let text = value.to_string();
        assert!(!text.contains("prod_secret123"));
        assert!(!text.contains("price_secret456"));
    }

    #[test]
    fn test_apply_recomputes_formatted_price() {
        let mut tariff = sample_tariff();
        let later = tariff.updated_at + chrono::Duration::seconds(5);
        tariff.apply(
            UpdateTariffRequest {
                prix: Some(1999),
                actif: Some(false),
                ..Default::default()
            },
            later,
        );
        assert_eq!(tariff.prix, 1999);
        assert_eq!(tariff.prix_formate, "19,99€");
        assert!(!tariff.actif);
        assert_eq!(tariff.updated_at, later);
        assert_eq!(tariff.nom, "Correction Standard");
    }

    #[test]
    fn test_apply_empty_stripe_id_clears_reference() {
        let mut tariff = sample_tariff();
        tariff.apply(
            UpdateTariffRequest {
                stripe_price_id: Some(String::new()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(tariff.stripe_price_id, None);
        assert_eq!(tariff.stripe_product_id.as_deref(), Some("prod_secret123"));
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateTariffRequest = serde_json::from_value(serde_json::json!({
            "nom": "",
            "prix": -5,
            "typeService": "Correction",
            "dureeEstimee": "5 jours"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nom"));
        assert!(fields.contains_key("prix"));
    }

    #[test]
    fn test_new_tariff_from_request_defaults() {
        let req: CreateTariffRequest = serde_json::from_value(serde_json::json!({
            "nom": "Pack KDP",
            "prix": 35000,
            "typeService": "Mise en page",
            "dureeEstimee": "3 semaines",
            "stripePriceId": ""
        }))
        .unwrap();
        let new = NewTariff::from(req);
        assert!(new.actif);
        assert_eq!(new.ordre, 0);
        assert_eq!(new.prix_formate, "350€");
        assert_eq!(new.stripe_price_id, None);
    }
}
