use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Numeric catalog identifier, the only key used for equality and lookup.
pub type CreatureId = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub pokedex_id: CreatureId,
    #[serde(default)]
    pub generation: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<LocalizedNames>,
    #[serde(default)]
    pub sprites: Option<Sprites>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<TypeTag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub talents: Vec<Talent>,
    #[serde(default)]
    pub stats: Option<Stats>,
    #[serde(default)]
    pub resistances: Option<Vec<Resistance>>,
    #[serde(default)]
    pub evolution: Option<Evolution>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub egg_groups: Option<Vec<String>>,
    #[serde(default)]
    pub sexe: Option<GenderRatio>,
    #[serde(default)]
    pub catch_rate: Option<u32>,
    #[serde(default)]
    pub level_100: Option<u64>,
}

impl Creature {
    pub fn with_id(pokedex_id: CreatureId) -> Self {
        Self {
            pokedex_id,
            generation: None,
            category: None,
            name: None,
            sprites: None,
            types: Vec::new(),
            talents: Vec::new(),
            stats: None,
            resistances: None,
            evolution: None,
            height: None,
            weight: None,
            egg_groups: None,
            sexe: None,
            catch_rate: None,
            level_100: None,
        }
    }

    pub fn id(&self) -> CreatureId {
        self.pokedex_id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.fr.as_deref())
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().filter_map(|t| t.name.as_deref())
    }

    pub fn has_type(&self, wanted: &str) -> bool {
        let wanted = wanted.to_lowercase();
        self.type_names().any(|name| name.to_lowercase() == wanted)
    }

    pub fn stat_total(&self) -> u32 {
        self.stats.as_ref().map(Stats::total).unwrap_or(0)
    }
}

impl PartialEq for Creature {
    fn eq(&self, other: &Self) -> bool {
        self.pokedex_id == other.pokedex_id
    }
}

impl Eq for Creature {}

impl Hash for Creature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pokedex_id.hash(state);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedNames {
    #[serde(default)]
    pub fr: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
    #[serde(default)]
    pub jp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub regular: Option<String>,
    #[serde(default)]
    pub shiny: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmax: Option<GmaxSprites>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmaxSprites {
    #[serde(default)]
    pub regular: Option<String>,
    #[serde(default)]
    pub shiny: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTag {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talent {
    #[serde(default)]
    pub name: Option<String>,
    /// Hidden talent ("talent caché").
    #[serde(default, deserialize_with = "null_as_default")]
    pub tc: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hp: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub atk: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub def: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spe_atk: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spe_def: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vit: u32,
}

impl Stats {
    pub const KEYS: [&'static str; 6] = ["hp", "atk", "def", "spe_atk", "spe_def", "vit"];

    pub fn total(&self) -> u32 {
        self.values().iter().sum()
    }

    pub fn values(&self) -> [u32; 6] {
        [
            self.hp,
            self.atk,
            self.def,
            self.spe_atk,
            self.spe_def,
            self.vit,
        ]
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, u32)> {
        Self::KEYS.into_iter().zip(self.values())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resistance {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub multiplier: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    #[serde(default)]
    pub pre: Option<Vec<EvolutionLink>>,
    #[serde(default)]
    pub next: Option<Vec<EvolutionLink>>,
    #[serde(default)]
    pub mega: Option<Vec<MegaEvolution>>,
}

impl Evolution {
    pub fn referenced_ids(&self) -> Vec<CreatureId> {
        self.pre
            .iter()
            .chain(self.next.iter())
            .flatten()
            .filter_map(|link| link.pokedex_id)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionLink {
    #[serde(default)]
    pub pokedex_id: Option<CreatureId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MegaEvolution {
    #[serde(default)]
    pub orbe: Option<String>,
    #[serde(default)]
    pub sprites: Option<Sprites>,
}

/// Percentages; genderless creatures come through as `sexe: null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenderRatio {
    #[serde(default)]
    pub male: Option<f64>,
    #[serde(default)]
    pub female: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_record_with_nulls_and_missing_fields() {
        let raw = r#"{
            "pokedex_id": 0,
            "generation": 0,
            "category": "Pokémon Missingno",
            "name": { "fr": "MissingNo.", "en": "MissingNo.", "jp": "けつばん" },
            "types": null,
            "talents": null,
            "stats": null,
            "resistances": null,
            "evolution": null
        }"#;

        let creature: Creature = serde_json::from_str(raw).expect("record should decode");
        assert_eq!(creature.id(), 0);
        assert!(creature.types.is_empty());
        assert!(creature.talents.is_empty());
        assert_eq!(creature.stat_total(), 0);
        assert!(creature.sexe.is_none());
        assert_eq!(creature.display_name(), Some("MissingNo."));
    }

    #[test]
    fn equality_only_looks_at_identifier() {
        let mut a = Creature::with_id(25);
        let b = Creature::with_id(25);
        a.category = Some("Pokémon Souris".to_string());
        assert_eq!(a, b);
        assert_ne!(a, Creature::with_id(26));
    }

    #[test]
    fn type_match_ignores_case() {
        let mut creature = Creature::with_id(4);
        creature.types.push(TypeTag {
            name: Some("Électrik".to_string()),
            image: None,
        });
        assert!(creature.has_type("électrik"));
        assert!(creature.has_type("ÉLECTRIK"));
        assert!(!creature.has_type("Feu"));
    }

    #[test]
    fn evolution_lists_referenced_ids_in_order() {
        let evolution = Evolution {
            pre: Some(vec![EvolutionLink {
                pokedex_id: Some(1),
                name: Some("Bulbizarre".to_string()),
                condition: None,
            }]),
            next: Some(vec![
                EvolutionLink {
                    pokedex_id: Some(3),
                    name: Some("Florizarre".to_string()),
                    condition: Some("Niveau 32".to_string()),
                },
                EvolutionLink {
                    pokedex_id: None,
                    name: Some("Inconnu".to_string()),
                    condition: None,
                },
            ]),
            mega: None,
        };
        assert_eq!(evolution.referenced_ids(), vec![1, 3]);
    }

    #[test]
    fn null_nested_fields_read_as_unknown() {
        let raw = r#"{
            "pokedex_id": 6,
            "talents": [{ "name": "Brasier", "tc": null }],
            "stats": { "hp": 78, "atk": null, "def": 78, "spe_atk": 109, "spe_def": 85, "vit": 100 },
            "resistances": [{ "name": "Feu", "multiplier": null }, { "name": null, "multiplier": 0.5 }],
            "evolution": { "pre": [{ "name": "Reptincel" }], "next": null, "mega": null },
            "sexe": { "male": 87.5 }
        }"#;

        let creature: Creature = serde_json::from_str(raw).expect("record should decode");
        assert!(!creature.talents[0].tc);
        assert_eq!(creature.stats.map(|s| s.atk), Some(0));
        assert_eq!(creature.stat_total(), 450);

        let resistances = creature.resistances.expect("resistances");
        assert_eq!(resistances[0].multiplier, None);
        assert_eq!(resistances[1].name, "");
        assert_eq!(resistances[1].multiplier, Some(0.5));

        let evolution = creature.evolution.expect("evolution");
        assert!(evolution.referenced_ids().is_empty());
        assert_eq!(evolution.pre.expect("pre")[0].name.as_deref(), Some("Reptincel"));

        let sexe = creature.sexe.expect("sexe");
        assert_eq!(sexe.male, Some(87.5));
        assert_eq!(sexe.female, None);
    }

    #[test]
    fn one_sparse_record_does_not_sink_the_list() {
        let raw = r#"[
            { "pokedex_id": 25, "name": { "fr": "Pikachu" } },
            { "pokedex_id": 26, "sexe": { "female": 50.0 }, "stats": { "hp": null } }
        ]"#;

        let records: Vec<Creature> = serde_json::from_str(raw).expect("list should decode");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].stat_total(), 0);
    }
}
