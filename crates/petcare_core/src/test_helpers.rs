#![cfg(test)]

pub mod pets {
    use crate::types::Pet;

    pub fn max() -> Pet {
        Pet::new("max", "Max")
    }

    pub fn luna() -> Pet {
        Pet::new("luna", "Luna")
    }
}

pub mod generation {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tokio::sync::Notify;

    use crate::Result;
    use crate::error::CoreError;
    use crate::generation::ContentGenerator;
    use crate::id::PetId;
    use crate::types::{CalendarEvent, Pet, PillColor, Reminder, Status, Tip};

    /// Shared count of generator calls across all three artifact kinds.
    #[derive(Debug, Clone, Default)]
    pub struct CallCounter(Arc<AtomicUsize>);

    impl CallCounter {
        pub fn total(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }

        fn bump(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Holds the first tip call until released.
    #[derive(Debug, Default)]
    pub struct Gate {
        entered: Notify,
        release: Notify,
    }

    impl Gate {
        pub async fn wait_entered(&self) {
            self.entered.notified().await;
        }

        pub fn release(&self) {
            self.release.notify_one();
        }
    }

    /// Lets a test turn previously failing tips back on.
    #[derive(Debug, Clone, Default)]
    pub struct TipSwitch(Arc<AtomicBool>);

    impl TipSwitch {
        pub fn recover(&self) {
            self.0.store(true, Ordering::SeqCst);
        }

        fn recovered(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Deterministic generator with per-pet failure injection.
    #[derive(Debug, Default)]
    pub struct ScriptedGenerator {
        calls: CallCounter,
        failing_tips: HashSet<PetId>,
        tip_switch: TipSwitch,
        failing_reminders: HashSet<PetId>,
        foreign_tip_ids: bool,
        gate: Option<Arc<Gate>>,
    }

    impl ScriptedGenerator {
        pub fn calls(&self) -> CallCounter {
            self.calls.clone()
        }

        pub fn failing_tips_for(mut self, pet: &str) -> Self {
            self.failing_tips.insert(PetId::from(pet));
            self
        }

        pub fn failing_reminders_for(mut self, pet: &str) -> Self {
            self.failing_reminders.insert(PetId::from(pet));
            self
        }

        /// Return tips tagged with the wrong pet id.
        pub fn with_foreign_tip_ids(mut self) -> Self {
            self.foreign_tip_ids = true;
            self
        }

        pub fn gated(mut self) -> Self {
            self.gate = Some(Arc::new(Gate::default()));
            self
        }

        pub fn gate(&self) -> Arc<Gate> {
            self.gate.clone().unwrap_or_default()
        }

        pub fn tip_switch(&self) -> TipSwitch {
            self.tip_switch.clone()
        }
    }

    #[async_trait]
    impl ContentGenerator for ScriptedGenerator {
        async fn generate_tip(&self, pet: &Pet, _events: &[CalendarEvent]) -> Result<Option<Tip>> {
            self.calls.bump();
            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            if self.failing_tips.contains(&pet.id) && !self.tip_switch.recovered() {
                return Err(CoreError::generation_failed(&pet.id, "tip", "model offline"));
            }
            let pet_id = if self.foreign_tip_ids {
                PetId::from("someone-else")
            } else {
                pet.id.clone()
            };
            Ok(Some(Tip::new(
                pet_id,
                "🐾",
                format!("Tip for {}", pet.name),
                "Keep up the good work",
            )))
        }

        async fn generate_status(&self, pet: &Pet, _events: &[CalendarEvent]) -> Status {
            self.calls.bump();
            Status {
                summary: format!("{} is doing well", pet.name),
                pills: Vec::new(),
            }
        }

        async fn generate_reminders(
            &self,
            pet: &Pet,
            _events: &[CalendarEvent],
        ) -> Result<Vec<Reminder>> {
            self.calls.bump();
            if self.failing_reminders.contains(&pet.id) {
                return Err(CoreError::generation_failed(
                    &pet.id,
                    "reminders",
                    "model offline",
                ));
            }
            Ok(vec![Reminder {
                pet_id: pet.id.clone(),
                title: format!("Walk {}", pet.name),
                detail: "Evening walk".to_string(),
                due: Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap(),
                icon: "figure.walk".to_string(),
                tint: PillColor::Green,
            }])
        }
    }
}
