use std::fmt::Write as _;

use poketeam_core::core_api::well_known::{UNKNOWN_TYPE_COLOR, stat_label, type_color};
use poketeam_core::core_api::{MAX_TEAM_SIZE, Roster, RosterEntry, ShareCode, SharePayload};
use poketeam_core::creature::{Creature, CreatureId, EvolutionLink, Stats};
use poketeam_core::tier::{ResistanceTier, StatTier};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub mod debounce;
pub mod toast;

pub use debounce::{SEARCH_DEBOUNCE_MS, SearchDebouncer};
pub use toast::{Toast, ToastQueue, ToastSeverity};

const GRID_COL_NUMBER: usize = 6;
const GRID_COL_NAME: usize = 20;
const GRID_COL_TYPES: usize = 22;
const GRID_COL_GEN: usize = 5;
const STAT_LABEL_WIDTH: usize = 11;
const STAT_BAR_WIDTH: usize = 20;
const RESISTANCE_COL_WIDTH: usize = 12;
const RESISTANCE_COLUMNS: usize = 3;
const ROSTER_COL_NAME: usize = 18;

const STAT_HIGH_COLOR: &str = "#22C55E";
const STAT_MEDIUM_COLOR: &str = "#EAB308";
const STAT_LOW_COLOR: &str = "#EF4444";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    pub color: bool,
}

pub fn format_number(id: CreatureId) -> String {
    format!("#{id:03}")
}

pub fn stat_tier_color(tier: StatTier) -> &'static str {
    match tier {
        StatTier::High => STAT_HIGH_COLOR,
        StatTier::Medium => STAT_MEDIUM_COLOR,
        StatTier::Low => STAT_LOW_COLOR,
    }
}

pub fn resistance_tier_color(tier: ResistanceTier) -> &'static str {
    match tier {
        ResistanceTier::Immune => "#6B7280",
        ResistanceTier::DoubleResist => "#16A34A",
        ResistanceTier::Resist => "#22C55E",
        ResistanceTier::Neutral => "#9CA3AF",
        ResistanceTier::Weak => "#F97316",
        ResistanceTier::DoubleWeak => "#DC2626",
    }
}

pub fn badge_color(type_name: &str) -> &'static str {
    type_color(type_name).map_or(UNKNOWN_TYPE_COLOR, |(color, _)| color)
}

pub fn render_json_grid(records: &[Creature], in_team: &[CreatureId]) -> JsonValue {
    JsonValue::Array(
        records
            .iter()
            .map(|record| {
                let mut m = JsonMap::new();
                m.insert("id".to_string(), JsonValue::from(record.pokedex_id));
                m.insert(
                    "number".to_string(),
                    JsonValue::String(format_number(record.pokedex_id)),
                );
                m.insert("name".to_string(), opt_str(record.display_name()));
                m.insert("types".to_string(), type_names_to_json(record));
                m.insert("generation".to_string(), opt_num(record.generation));
                m.insert(
                    "stat_total".to_string(),
                    match &record.stats {
                        Some(stats) => JsonValue::from(stats.total()),
                        None => JsonValue::Null,
                    },
                );
                m.insert(
                    "sprite".to_string(),
                    opt_str(
                        record
                            .sprites
                            .as_ref()
                            .and_then(|sprites| sprites.regular.as_deref()),
                    ),
                );
                m.insert(
                    "in_team".to_string(),
                    JsonValue::Bool(in_team.contains(&record.pokedex_id)),
                );
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn render_json_detail(record: &Creature) -> JsonValue {
    let mut out = JsonMap::new();
    let names = record.name.clone().unwrap_or_default();

    out.insert("id".to_string(), JsonValue::from(record.pokedex_id));
    out.insert(
        "number".to_string(),
        JsonValue::String(format_number(record.pokedex_id)),
    );
    out.insert("name".to_string(), opt_str(names.fr.as_deref()));
    out.insert(
        "names".to_string(),
        serde_json::json!({
            "fr": names.fr,
            "en": names.en,
            "jp": names.jp,
        }),
    );
    out.insert("category".to_string(), opt_str(record.category.as_deref()));
    out.insert("generation".to_string(), opt_num(record.generation));
    out.insert(
        "types".to_string(),
        JsonValue::Array(
            record
                .type_names()
                .map(|name| {
                    let mut m = JsonMap::new();
                    m.insert("name".to_string(), JsonValue::String(name.to_string()));
                    m.insert(
                        "color".to_string(),
                        JsonValue::String(badge_color(name).to_string()),
                    );
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    out.insert("stats".to_string(), stats_to_json(record.stats.as_ref()));
    out.insert(
        "stat_total".to_string(),
        match &record.stats {
            Some(stats) => JsonValue::from(stats.total()),
            None => JsonValue::Null,
        },
    );
    out.insert(
        "talents".to_string(),
        JsonValue::Array(
            record
                .talents
                .iter()
                .map(|talent| {
                    let mut m = JsonMap::new();
                    m.insert("name".to_string(), opt_str(talent.name.as_deref()));
                    m.insert("hidden".to_string(), JsonValue::Bool(talent.tc));
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    out.insert("resistances".to_string(), resistances_to_json(record));
    out.insert("evolution".to_string(), evolution_to_json(record));
    out.insert("height".to_string(), opt_str(record.height.as_deref()));
    out.insert("weight".to_string(), opt_str(record.weight.as_deref()));
    out.insert(
        "egg_groups".to_string(),
        match &record.egg_groups {
            Some(groups) => JsonValue::from(groups.clone()),
            None => JsonValue::Null,
        },
    );
    out.insert(
        "gender".to_string(),
        match &record.sexe {
            Some(ratio) => serde_json::json!({"male": ratio.male, "female": ratio.female}),
            None => JsonValue::Null,
        },
    );
    out.insert("catch_rate".to_string(), opt_num(record.catch_rate));
    out.insert("level_100".to_string(), opt_num(record.level_100));
    out.insert(
        "sprites".to_string(),
        match &record.sprites {
            Some(sprites) => serde_json::json!({
                "regular": sprites.regular,
                "shiny": sprites.shiny,
            }),
            None => JsonValue::Null,
        },
    );

    JsonValue::Object(out)
}

pub fn render_json_roster(roster: &Roster) -> JsonValue {
    let summary = roster.summary();
    let mut out = JsonMap::new();

    out.insert("members".to_string(), JsonValue::from(roster.len()));
    out.insert("capacity".to_string(), JsonValue::from(MAX_TEAM_SIZE));
    out.insert("full".to_string(), JsonValue::Bool(roster.is_full()));
    out.insert(
        "slots".to_string(),
        JsonValue::Array(roster.entries().iter().map(roster_entry_to_json).collect()),
    );

    let mut totals = JsonMap::new();
    totals.insert(
        "stats".to_string(),
        JsonValue::Array(
            summary
                .stats
                .iter()
                .map(|stat| {
                    let mut m = JsonMap::new();
                    m.insert("key".to_string(), JsonValue::String(stat.key.clone()));
                    m.insert(
                        "label".to_string(),
                        JsonValue::String(stat_label(&stat.key).to_string()),
                    );
                    m.insert("sum".to_string(), JsonValue::from(stat.sum));
                    m.insert("average".to_string(), JsonValue::from(round1(stat.average)));
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    totals.insert("total".to_string(), JsonValue::from(summary.total));
    totals.insert("types".to_string(), JsonValue::from(summary.types));
    out.insert("summary".to_string(), JsonValue::Object(totals));

    JsonValue::Object(out)
}

pub fn render_json_share(url: &str, payload: &SharePayload, code: Option<&ShareCode>) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("ids".to_string(), JsonValue::from(payload.ids().to_vec()));
    out.insert("param".to_string(), JsonValue::String(payload.encode()));
    out.insert("url".to_string(), JsonValue::String(url.to_string()));
    out.insert(
        "qr_svg".to_string(),
        match code {
            Some(code) => JsonValue::String(code.to_svg()),
            None => JsonValue::Null,
        },
    );
    JsonValue::Object(out)
}

pub fn render_json_types(labels: &[String]) -> JsonValue {
    JsonValue::Array(
        labels
            .iter()
            .map(|label| {
                let (color, dark_text) = type_color(label).unwrap_or((UNKNOWN_TYPE_COLOR, false));
                let mut m = JsonMap::new();
                m.insert("name".to_string(), JsonValue::String(label.clone()));
                m.insert("color".to_string(), JsonValue::String(color.to_string()));
                m.insert("dark_text".to_string(), JsonValue::Bool(dark_text));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn render_json_toast(toast: &Toast) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "severity".to_string(),
        JsonValue::String(toast.severity.as_str().to_string()),
    );
    out.insert("message".to_string(), JsonValue::String(toast.message.clone()));
    JsonValue::Object(out)
}

fn roster_entry_to_json(entry: &RosterEntry) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("slot".to_string(), JsonValue::from(entry.slot));
    m.insert("id".to_string(), JsonValue::from(entry.id()));
    m.insert(
        "number".to_string(),
        JsonValue::String(format_number(entry.id())),
    );
    m.insert("name".to_string(), opt_str(entry.creature.display_name()));
    m.insert("types".to_string(), type_names_to_json(&entry.creature));
    m.insert(
        "added_at".to_string(),
        JsonValue::String(entry.added_at.to_rfc3339()),
    );
    JsonValue::Object(m)
}

fn stats_to_json(stats: Option<&Stats>) -> JsonValue {
    let Some(stats) = stats else {
        return JsonValue::Array(Vec::new());
    };
    JsonValue::Array(
        stats
            .entries()
            .map(|(key, value)| {
                let mut m = JsonMap::new();
                m.insert("key".to_string(), JsonValue::String(key.to_string()));
                m.insert(
                    "label".to_string(),
                    JsonValue::String(stat_label(key).to_string()),
                );
                m.insert("value".to_string(), JsonValue::from(value));
                m.insert(
                    "percent".to_string(),
                    JsonValue::from(StatTier::percent_of_ceiling(value)),
                );
                m.insert(
                    "tier".to_string(),
                    JsonValue::String(StatTier::from_value(value).as_str().to_string()),
                );
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn resistances_to_json(record: &Creature) -> JsonValue {
    JsonValue::Array(
        record
            .resistances
            .iter()
            .flatten()
            .map(|resistance| {
                let mut m = JsonMap::new();
                m.insert("name".to_string(), JsonValue::String(resistance.name.clone()));
                m.insert("multiplier".to_string(), opt_num(resistance.multiplier));
                m.insert(
                    "label".to_string(),
                    JsonValue::String(resistance_label(resistance.multiplier)),
                );
                m.insert(
                    "tier".to_string(),
                    opt_str(
                        resistance
                            .multiplier
                            .map(|multiplier| ResistanceTier::from_multiplier(multiplier).as_str()),
                    ),
                );
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn evolution_to_json(record: &Creature) -> JsonValue {
    let Some(evolution) = &record.evolution else {
        return JsonValue::Null;
    };
    let links = |links: &Option<Vec<EvolutionLink>>| {
        JsonValue::Array(
            links
                .iter()
                .flatten()
                .map(|link| {
                    let mut m = JsonMap::new();
                    m.insert("id".to_string(), opt_num(link.pokedex_id));
                    m.insert("name".to_string(), opt_str(link.name.as_deref()));
                    m.insert("condition".to_string(), opt_str(link.condition.as_deref()));
                    JsonValue::Object(m)
                })
                .collect(),
        )
    };

    let mut m = JsonMap::new();
    m.insert("pre".to_string(), links(&evolution.pre));
    m.insert("next".to_string(), links(&evolution.next));
    m.insert(
        "mega".to_string(),
        JsonValue::Array(
            evolution
                .mega
                .iter()
                .flatten()
                .map(|mega| opt_str(mega.orbe.as_deref()))
                .collect(),
        ),
    );
    JsonValue::Object(m)
}

fn type_names_to_json(record: &Creature) -> JsonValue {
    JsonValue::Array(
        record
            .type_names()
            .map(|name| JsonValue::String(name.to_string()))
            .collect(),
    )
}

fn opt_str(value: Option<&str>) -> JsonValue {
    match value {
        Some(v) => JsonValue::String(v.to_string()),
        None => JsonValue::Null,
    }
}

fn opt_num<T: Into<JsonValue>>(value: Option<T>) -> JsonValue {
    match value {
        Some(v) => v.into(),
        None => JsonValue::Null,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One row per creature. Rows for ids in `in_team` carry a `*` marker.
pub fn render_grid(records: &[Creature], in_team: &[CreatureId], options: TextRenderOptions) -> String {
    let mut out = String::new();

    if records.is_empty() {
        writeln!(out, "  Aucun Pokémon trouvé").expect("writing to String cannot fail");
        return out;
    }

    let header = format!(
        "   {:<n$}{:<m$}{:<t$}{:<g$}{}",
        "No.",
        "Nom",
        "Types",
        "Gén.",
        "Total",
        n = GRID_COL_NUMBER,
        m = GRID_COL_NAME,
        t = GRID_COL_TYPES,
        g = GRID_COL_GEN
    );
    writeln!(out, "{}", header.trim_end()).expect("writing to String cannot fail");

    for record in records {
        let marker = if in_team.contains(&record.pokedex_id) {
            '*'
        } else {
            ' '
        };
        let name = fit_column(record.display_name().unwrap_or("?"), GRID_COL_NAME - 1);
        let types = record.type_names().collect::<Vec<_>>().join(" / ");
        let types_cell = fit_column(&types, GRID_COL_TYPES - 1);
        let types_padding = GRID_COL_TYPES.saturating_sub(types_cell.chars().count());
        let types_cell = if options.color {
            paint_type_list(record, &types_cell)
        } else {
            types_cell
        };
        let generation = record
            .generation
            .map(|g| g.to_string())
            .unwrap_or_else(|| "-".to_string());
        let total = record
            .stats
            .as_ref()
            .map(|stats| stats.total().to_string())
            .unwrap_or_else(|| "-".to_string());

        let line = format!(
            " {marker} {:<n$}{:<m$}{}{}{:<g$}{}",
            format_number(record.pokedex_id),
            name,
            types_cell,
            " ".repeat(types_padding),
            generation,
            total,
            n = GRID_COL_NUMBER,
            m = GRID_COL_NAME,
            g = GRID_COL_GEN
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }

    writeln!(out).expect("writing to String cannot fail");
    writeln!(out, "  {} Pokémon", records.len()).expect("writing to String cannot fail");
    out
}

pub fn render_detail(record: &Creature, options: TextRenderOptions) -> String {
    let mut out = String::new();
    let name = record.display_name().unwrap_or("?");

    writeln!(out, "{} {}", format_number(record.pokedex_id), name)
        .expect("writing to String cannot fail");

    let mut subtitle: Vec<String> = Vec::new();
    if let Some(category) = &record.category {
        subtitle.push(category.clone());
    }
    if let Some(generation) = record.generation {
        subtitle.push(format!("Génération {generation}"));
    }
    if !subtitle.is_empty() {
        writeln!(out, "{}", subtitle.join(" · ")).expect("writing to String cannot fail");
    }
    if let Some(names) = &record.name {
        let others: Vec<&str> = [names.en.as_deref(), names.jp.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !others.is_empty() {
            writeln!(out, "{}", others.join(" / ")).expect("writing to String cannot fail");
        }
    }

    let badges: Vec<String> = record
        .type_names()
        .map(|type_name| type_badge(type_name, options))
        .collect();
    if !badges.is_empty() {
        writeln!(out, "Types: {}", badges.join(" ")).expect("writing to String cannot fail");
    }

    if let Some(stats) = &record.stats {
        writeln!(out).expect("writing to String cannot fail");
        writeln!(out, "Statistiques").expect("writing to String cannot fail");
        for (key, value) in stats.entries() {
            let tier = StatTier::from_value(value);
            let bar = stat_bar(value, STAT_BAR_WIDTH);
            let bar = if options.color {
                paint(&bar, stat_tier_color(tier))
            } else {
                bar
            };
            writeln!(
                out,
                "  {:<w$}{:>4}  {}  {}",
                stat_label(key),
                value,
                bar,
                tier,
                w = STAT_LABEL_WIDTH
            )
            .expect("writing to String cannot fail");
        }
        writeln!(
            out,
            "  {:<w$}{:>4}",
            "Total",
            stats.total(),
            w = STAT_LABEL_WIDTH
        )
        .expect("writing to String cannot fail");
    }

    if let Some(evolution) = &record.evolution {
        let pre = format_links(evolution.pre.as_deref());
        let next = format_links(evolution.next.as_deref());
        let megas: Vec<&str> = evolution
            .mega
            .iter()
            .flatten()
            .filter_map(|mega| mega.orbe.as_deref())
            .collect();
        if pre.is_some() || next.is_some() || !megas.is_empty() {
            writeln!(out).expect("writing to String cannot fail");
            writeln!(out, "Évolutions").expect("writing to String cannot fail");
            if let Some(pre) = pre {
                writeln!(out, "  Précédentes : {pre}").expect("writing to String cannot fail");
            }
            if let Some(next) = next {
                writeln!(out, "  Suivantes   : {next}").expect("writing to String cannot fail");
            }
            if !megas.is_empty() {
                writeln!(out, "  Méga        : {}", megas.join(", "))
                    .expect("writing to String cannot fail");
            }
        }
    }

    if !record.talents.is_empty() {
        writeln!(out).expect("writing to String cannot fail");
        writeln!(out, "Talents").expect("writing to String cannot fail");
        for talent in &record.talents {
            let name = talent.name.as_deref().unwrap_or("?");
            if talent.tc {
                writeln!(out, "  {name} (caché)").expect("writing to String cannot fail");
            } else {
                writeln!(out, "  {name}").expect("writing to String cannot fail");
            }
        }
    }

    if let Some(resistances) = record.resistances.as_ref().filter(|r| !r.is_empty()) {
        writeln!(out).expect("writing to String cannot fail");
        writeln!(out, "Résistances").expect("writing to String cannot fail");
        let cells: Vec<String> = resistances
            .iter()
            .map(|resistance| {
                let label = resistance_label(resistance.multiplier);
                let label = match resistance.multiplier {
                    Some(multiplier) if options.color => {
                        let tier = ResistanceTier::from_multiplier(multiplier);
                        paint(&label, resistance_tier_color(tier))
                    }
                    _ => label,
                };
                let name = fit_column(&resistance.name, RESISTANCE_COL_WIDTH - 2);
                let padding = RESISTANCE_COL_WIDTH.saturating_sub(name.chars().count());
                format!("{name}{}{label}", " ".repeat(padding))
            })
            .collect();
        for chunk in cells.chunks(RESISTANCE_COLUMNS) {
            writeln!(out, "  {}", chunk.join("    ")).expect("writing to String cannot fail");
        }
    }

    let mut traits: Vec<String> = Vec::new();
    if let Some(height) = &record.height {
        traits.push(format!("Taille : {height}"));
    }
    if let Some(weight) = &record.weight {
        traits.push(format!("Poids : {weight}"));
    }
    if let Some(rate) = record.catch_rate {
        traits.push(format!("Taux de capture : {rate}"));
    }
    if let Some(xp) = record.level_100 {
        traits.push(format!("Exp. niveau 100 : {}", format_thousands(xp)));
    }
    if !traits.is_empty() {
        writeln!(out).expect("writing to String cannot fail");
        writeln!(out, "Caractéristiques").expect("writing to String cannot fail");
        for line in traits {
            writeln!(out, "  {line}").expect("writing to String cannot fail");
        }
    }

    let eggs = record.egg_groups.as_ref().filter(|groups| !groups.is_empty());
    if eggs.is_some() || record.sexe.is_some() {
        writeln!(out).expect("writing to String cannot fail");
        writeln!(out, "Reproduction").expect("writing to String cannot fail");
        if let Some(groups) = eggs {
            writeln!(out, "  Groupes d'œufs : {}", groups.join(", "))
                .expect("writing to String cannot fail");
        }
        if let Some(ratio) = &record.sexe {
            writeln!(
                out,
                "  Sexe : ♂ {}% / ♀ {}%",
                percent_or_unknown(ratio.male),
                percent_or_unknown(ratio.female)
            )
            .expect("writing to String cannot fail");
        }
    }

    out
}

pub fn render_roster(roster: &Roster, options: TextRenderOptions) -> String {
    let mut out = String::new();
    writeln!(out, "Mon équipe ({}/{})", roster.len(), MAX_TEAM_SIZE)
        .expect("writing to String cannot fail");

    for slot in 0..MAX_TEAM_SIZE {
        match roster.get(slot) {
            Some(entry) => {
                let name = fit_column(
                    entry.creature.display_name().unwrap_or("?"),
                    ROSTER_COL_NAME - 1,
                );
                let badges: Vec<String> = entry
                    .creature
                    .type_names()
                    .map(|type_name| type_badge(type_name, options))
                    .collect();
                let line = format!(
                    "  {}. {} {:<w$}{}",
                    slot + 1,
                    format_number(entry.id()),
                    name,
                    badges.join(" "),
                    w = ROSTER_COL_NAME
                );
                writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
            }
            None => {
                writeln!(out, "  {}. (vide)", slot + 1).expect("writing to String cannot fail");
            }
        }
    }

    if roster.is_empty() {
        return out;
    }

    let summary = roster.summary();
    writeln!(out).expect("writing to String cannot fail");
    let averages: Vec<String> = summary
        .stats
        .iter()
        .map(|stat| format!("{} {:.0}", stat_label(&stat.key), stat.average))
        .collect();
    writeln!(out, "Moyennes : {}", averages.join(", ")).expect("writing to String cannot fail");
    writeln!(out, "Total des stats : {}", summary.total).expect("writing to String cannot fail");
    if !summary.types.is_empty() {
        writeln!(out, "Types couverts : {}", summary.types.join(", "))
            .expect("writing to String cannot fail");
    }
    out
}

pub fn render_share(url: &str, code: Option<&ShareCode>) -> String {
    let mut out = String::new();
    writeln!(out, "Lien de partage : {url}").expect("writing to String cannot fail");
    if let Some(code) = code {
        writeln!(out).expect("writing to String cannot fail");
        out.push_str(&code.to_terminal());
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

pub fn render_types(labels: &[String], options: TextRenderOptions) -> String {
    let mut out = String::new();
    for label in labels {
        let color = badge_color(label);
        writeln!(out, "  {}  {color}", type_badge(label, options))
            .expect("writing to String cannot fail");
    }
    out
}

pub fn render_toast(toast: &Toast, options: TextRenderOptions) -> String {
    let prefix = match toast.severity {
        ToastSeverity::Success => "✓",
        ToastSeverity::Info => "i",
        ToastSeverity::Warning => "!",
        ToastSeverity::Error => "✗",
    };
    let prefix = if options.color {
        let color = match toast.severity {
            ToastSeverity::Success => STAT_HIGH_COLOR,
            ToastSeverity::Info => UNKNOWN_TYPE_COLOR,
            ToastSeverity::Warning => STAT_MEDIUM_COLOR,
            ToastSeverity::Error => STAT_LOW_COLOR,
        };
        paint(prefix, color)
    } else {
        prefix.to_string()
    };
    format!("{prefix} {}", toast.message)
}

pub fn stat_bar(value: u32, width: usize) -> String {
    let percent = StatTier::percent_of_ceiling(value) as usize;
    let filled = (percent * width + 50) / 100;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn type_badge(type_name: &str, options: TextRenderOptions) -> String {
    if !options.color {
        return format!("[{type_name}]");
    }
    let (color, dark_text) = type_color(type_name).unwrap_or((UNKNOWN_TYPE_COLOR, false));
    let Some((r, g, b)) = hex_rgb(color) else {
        return format!("[{type_name}]");
    };
    let fg = if dark_text { "30" } else { "97" };
    format!("\x1b[48;2;{r};{g};{b}m\x1b[{fg}m {type_name} \x1b[0m")
}

fn paint_type_list(record: &Creature, fallback: &str) -> String {
    let names: Vec<&str> = record.type_names().collect();
    if names.join(" / ") != fallback {
        return fallback.to_string();
    }
    names
        .iter()
        .map(|name| paint(name, badge_color(name)))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn paint(text: &str, hex: &str) -> String {
    match hex_rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn format_links(links: Option<&[EvolutionLink]>) -> Option<String> {
    let links = links.filter(|links| !links.is_empty())?;
    Some(
        links
            .iter()
            .map(|link| {
                let name = link.name.as_deref().unwrap_or("?");
                let label = match link.pokedex_id {
                    Some(id) => format!("{} {name}", format_number(id)),
                    None => name.to_string(),
                };
                match &link.condition {
                    Some(condition) => format!("{label} ({condition})"),
                    None => label,
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn resistance_label(multiplier: Option<f64>) -> String {
    multiplier.map_or_else(|| "?".to_string(), ResistanceTier::label)
}

fn percent_or_unknown(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_string(), |value| value.to_string())
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn format_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(' ');
        }
        result.push(c);
    }
    result
}
