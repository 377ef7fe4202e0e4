use std::cmp::Ordering;

use crate::creature::Creature;

use super::types::{FilterCriteria, SortKey};

pub fn filter(records: &[Creature], criteria: &FilterCriteria) -> Vec<Creature> {
    records
        .iter()
        .filter(|record| matches(record, criteria))
        .cloned()
        .collect()
}

pub fn matches(record: &Creature, criteria: &FilterCriteria) -> bool {
    matches_query(record, &criteria.query)
        && matches_types(record, &criteria.types)
        && matches_generation(record, criteria.generation)
}

// The id match is an unanchored substring: "1" hits 1, 10, 21, 100.
fn matches_query(record: &Creature, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let name_hit = record
        .display_name()
        .is_some_and(|name| name.to_lowercase().contains(&needle));
    name_hit || record.pokedex_id.to_string().contains(query)
}

fn matches_types(record: &Creature, types: &[String]) -> bool {
    types.is_empty() || types.iter().any(|wanted| record.has_type(wanted))
}

fn matches_generation(record: &Creature, generation: Option<u32>) -> bool {
    match generation {
        None => true,
        Some(wanted) => record.generation == Some(wanted),
    }
}

pub fn sort(records: &[Creature], key: SortKey) -> Vec<Creature> {
    let mut sorted = records.to_vec();
    match key {
        SortKey::IdAsc => sorted.sort_by_key(|r| r.pokedex_id),
        SortKey::IdDesc => sorted.sort_by(|a, b| b.pokedex_id.cmp(&a.pokedex_id)),
        SortKey::NameAsc => sorted.sort_by(|a, b| compare_names(a, b)),
        SortKey::NameDesc => sorted.sort_by(|a, b| compare_names(b, a)),
        SortKey::StatsDesc => sorted.sort_by(|a, b| b.stat_total().cmp(&a.stat_total())),
    }
    sorted
}

fn compare_names(a: &Creature, b: &Creature) -> Ordering {
    collate(
        a.display_name().unwrap_or_default(),
        b.display_name().unwrap_or_default(),
    )
}

/// Locale-aware comparison for catalog names: accents and case are ignored
/// at the primary level, and only break ties afterwards.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = fold_key(a).cmp(&fold_key(b));
    primary
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

fn fold_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars().flat_map(char::to_lowercase) {
        match ch {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
            'ç' => out.push('c'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ñ' => out.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'œ' => out.push_str("oe"),
            'æ' => out.push_str("ae"),
            '♀' | '♂' | '.' | '\'' | '’' | '-' | ' ' => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{LocalizedNames, Stats, TypeTag};

    fn creature(id: u32, name: &str, types: &[&str], generation: u32) -> Creature {
        let mut c = Creature::with_id(id);
        c.name = Some(LocalizedNames {
            fr: Some(name.to_string()),
            en: None,
            jp: None,
        });
        c.types = types
            .iter()
            .map(|t| TypeTag {
                name: Some(t.to_string()),
                image: None,
            })
            .collect();
        c.generation = Some(generation);
        c
    }

    #[test]
    fn id_query_is_an_unanchored_substring() {
        let records = vec![
            creature(1, "Bulbizarre", &["Plante"], 1),
            creature(10, "Chenipan", &["Insecte"], 1),
            creature(21, "Piafabec", &["Normal", "Vol"], 1),
            creature(4, "Salamèche", &["Feu"], 1),
            creature(100, "Voltorbe", &["Électrik"], 1),
        ];
        let ids: Vec<u32> = filter(&records, &FilterCriteria::new().with_query("1"))
            .iter()
            .map(Creature::id)
            .collect();
        assert_eq!(ids, vec![1, 10, 21, 100]);
    }

    #[test]
    fn name_query_ignores_case() {
        let records = vec![
            creature(4, "Salamèche", &["Feu"], 1),
            creature(5, "Reptincel", &["Feu"], 1),
        ];
        let out = filter(&records, &FilterCriteria::new().with_query("SALAM"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id(), 4);
    }

    #[test]
    fn records_without_names_or_types_never_match_those_predicates() {
        let records = vec![Creature::with_id(7)];
        assert!(filter(&records, &FilterCriteria::new().with_query("abc")).is_empty());
        assert!(filter(&records, &FilterCriteria::new().with_type("Eau")).is_empty());
        assert!(filter(&records, &FilterCriteria::new().with_generation(1)).is_empty());
        assert_eq!(filter(&records, &FilterCriteria::new().with_query("7")).len(), 1);
    }

    #[test]
    fn predicates_combine_with_and() {
        let records = vec![
            creature(6, "Dracaufeu", &["Feu", "Vol"], 1),
            creature(155, "Héricendre", &["Feu"], 2),
            creature(16, "Roucool", &["Normal", "Vol"], 1),
        ];
        let criteria = FilterCriteria::new().with_type("vol").with_generation(1);
        let ids: Vec<u32> = filter(&records, &criteria).iter().map(Creature::id).collect();
        assert_eq!(ids, vec![6, 16]);

        let criteria = criteria.with_query("dra");
        let ids: Vec<u32> = filter(&records, &criteria).iter().map(Creature::id).collect();
        assert_eq!(ids, vec![6]);
    }

    #[test]
    fn toggle_type_adds_then_removes() {
        let mut criteria = FilterCriteria::new();
        criteria.toggle_type("Feu");
        criteria.toggle_type("Eau");
        assert_eq!(criteria.types, vec!["Feu", "Eau"]);
        criteria.toggle_type("Feu");
        assert_eq!(criteria.types, vec!["Eau"]);
    }

    #[test]
    fn name_sort_ignores_accents() {
        let records = vec![
            creature(1, "Zarbi", &[], 2),
            creature(2, "Écayon", &[], 4),
            creature(3, "Ectoplasma", &[], 1),
            creature(4, "Abo", &[], 1),
        ];
        let names: Vec<String> = sort(&records, SortKey::NameAsc)
            .iter()
            .map(|c| c.display_name().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["Abo", "Écayon", "Ectoplasma", "Zarbi"]);

        let names: Vec<String> = sort(&records, SortKey::NameDesc)
            .iter()
            .map(|c| c.display_name().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["Zarbi", "Ectoplasma", "Écayon", "Abo"]);
    }

    #[test]
    fn stats_sort_puts_unknown_stats_last_and_keeps_ties_stable() {
        let mut strong = Creature::with_id(3);
        strong.stats = Some(Stats {
            hp: 80,
            atk: 82,
            def: 83,
            spe_atk: 100,
            spe_def: 100,
            vit: 80,
        });
        let mut tied_a = Creature::with_id(10);
        tied_a.stats = Some(Stats {
            hp: 45,
            ..Stats::default()
        });
        let mut tied_b = Creature::with_id(11);
        tied_b.stats = Some(Stats {
            atk: 45,
            ..Stats::default()
        });
        let unknown = Creature::with_id(0);

        let records = vec![tied_a, unknown, strong, tied_b];
        let ids: Vec<u32> = sort(&records, SortKey::StatsDesc)
            .iter()
            .map(Creature::id)
            .collect();
        assert_eq!(ids, vec![3, 10, 11, 0]);
    }

    #[test]
    fn sort_key_round_trips_through_text() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>(), Ok(key));
        }
        assert!("by-weight".parse::<SortKey>().is_err());
    }

    fn sample() -> Vec<Creature> {
        vec![
            creature(25, "Pikachu", &["Électrik"], 1),
            creature(6, "Dracaufeu", &["Feu", "Vol"], 1),
            creature(152, "Germignon", &["Plante"], 2),
            creature(1, "Bulbizarre", &["Plante", "Poison"], 1),
            creature(16, "Roucool", &["Normal", "Vol"], 1),
            creature(155, "Héricendre", &["Feu"], 2),
            Creature::with_id(0),
        ]
    }

    fn sample_criteria() -> Vec<FilterCriteria> {
        vec![
            FilterCriteria::new(),
            FilterCriteria::new().with_query("1"),
            FilterCriteria::new().with_query("ro"),
            FilterCriteria::new().with_type("Vol"),
            FilterCriteria::new().with_type("Feu").with_type("plante"),
            FilterCriteria::new().with_generation(2),
            FilterCriteria::new().with_type("Feu").with_generation(1).with_query("d"),
        ]
    }

    #[test]
    fn filter_is_idempotent() {
        let records = sample();
        for criteria in sample_criteria() {
            let once = filter(&records, &criteria);
            let twice = filter(&once, &criteria);
            let ids = |records: &[Creature]| records.iter().map(Creature::id).collect::<Vec<_>>();
            assert_eq!(ids(&once), ids(&twice), "criteria {criteria:?}");
        }
    }

    #[test]
    fn type_selection_only_yields_matching_records() {
        let records = sample();
        for criteria in sample_criteria().into_iter().filter(|c| !c.types.is_empty()) {
            let out = filter(&records, &criteria);
            assert!(!out.is_empty(), "criteria {criteria:?}");
            for record in &out {
                assert!(
                    criteria.types.iter().any(|wanted| record.has_type(wanted)),
                    "#{} has none of {:?}",
                    record.id(),
                    criteria.types
                );
            }
        }
    }

    #[test]
    fn sort_keeps_every_record() {
        let records = sample();
        let mut expected: Vec<u32> = records.iter().map(Creature::id).collect();
        expected.sort_unstable();
        for key in SortKey::ALL {
            let mut ids: Vec<u32> = sort(&records, key).iter().map(Creature::id).collect();
            ids.sort_unstable();
            assert_eq!(ids, expected, "sort by {key}");
        }
    }

    #[test]
    fn descending_ids_reverse_ascending_ids() {
        let records = sample();
        let ascending: Vec<u32> = sort(&records, SortKey::IdAsc).iter().map(Creature::id).collect();
        let mut descending: Vec<u32> =
            sort(&records, SortKey::IdDesc).iter().map(Creature::id).collect();
        descending.reverse();
        assert_eq!(ascending, descending);
        assert_eq!(ascending, vec![0, 1, 6, 16, 25, 152, 155]);
    }
}
