//! Transient notifications raised by catalog and team operations.
//!
//! Shells decide how to show a toast (stderr line, DOM element); this module
//! only owns the wording, the severity and the on-screen lifetime.

use poketeam_core::core_api::{CoreError, RosterRejection};
use poketeam_core::creature::Creature;
use serde::{Deserialize, Serialize};

/// At most this many toasts are visible; the oldest is dropped first.
pub const MAX_VISIBLE_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastSeverity {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match *self {
            Self::Success | Self::Info | Self::Warning => 4000,
            Self::Error => 7000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub severity: ToastSeverity,
    pub message: String,
}

impl Toast {
    pub fn new(severity: ToastSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn added(creature: &Creature) -> Self {
        Self::new(
            ToastSeverity::Success,
            format!("{} ajouté à votre équipe !", name_of(creature)),
        )
    }

    pub fn removed(creature: &Creature) -> Self {
        Self::new(
            ToastSeverity::Info,
            format!("{} retiré de votre équipe.", name_of(creature)),
        )
    }

    pub fn moved(creature: &Creature, slot: usize) -> Self {
        Self::new(
            ToastSeverity::Info,
            format!("{} déplacé en position {}.", name_of(creature), slot + 1),
        )
    }

    pub fn cleared() -> Self {
        Self::new(ToastSeverity::Success, "Équipe vidée !")
    }

    /// `count` is the number of ids read from the link, not the number kept.
    pub fn imported(count: usize) -> Self {
        Self::new(
            ToastSeverity::Success,
            format!("Équipe chargée avec {count} Pokémon !"),
        )
    }

    pub fn nothing_to_import() -> Self {
        Self::new(ToastSeverity::Warning, "Aucun Pokémon à importer dans ce lien.")
    }

    pub fn rejected(rejection: &RosterRejection) -> Self {
        match rejection {
            RosterRejection::Full => Self::new(
                ToastSeverity::Error,
                "Votre équipe est pleine ! Retirez un Pokémon d'abord.",
            ),
            RosterRejection::Duplicate(_) => Self::new(
                ToastSeverity::Warning,
                "Ce Pokémon est déjà dans votre équipe !",
            ),
            RosterRejection::OutOfBounds { index, len } => Self::new(
                ToastSeverity::Warning,
                format!("Position {} invalide pour une équipe de {len}.", index + 1),
            ),
        }
    }

    pub fn load_failed() -> Self {
        Self::new(ToastSeverity::Error, "Erreur lors du chargement des Pokémon")
    }

    pub fn import_failed(error: &CoreError) -> Self {
        Self::new(
            ToastSeverity::Error,
            format!("Impossible de charger l'équipe partagée : {}", error.message),
        )
    }

    pub fn not_in_team(id: u32) -> Self {
        Self::new(
            ToastSeverity::Warning,
            format!("#{id:03} n'est pas dans votre équipe."),
        )
    }
}

fn name_of(creature: &Creature) -> String {
    creature
        .display_name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{:03}", creature.pokedex_id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct QueuedToast {
    id: u64,
    toast: Toast,
    expires_at_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    visible: Vec<QueuedToast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast, now_ms: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.visible.len() >= MAX_VISIBLE_TOASTS {
            self.visible.remove(0);
        }
        let expires_at_ms = now_ms.saturating_add(toast.severity.duration_ms());
        self.visible.push(QueuedToast {
            id,
            toast,
            expires_at_ms,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.visible.retain(|queued| queued.id != id);
    }

    pub fn expire(&mut self, now_ms: u64) {
        self.visible.retain(|queued| queued.expires_at_ms > now_ms);
    }

    pub fn visible(&self) -> impl Iterator<Item = (u64, &Toast)> {
        self.visible.iter().map(|queued| (queued.id, &queued.toast))
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}
