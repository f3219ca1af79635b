use chrono::NaiveDate;

use crate::events::EventRecord;
use crate::predictor::ActiveSigns;
use crate::zodiac::Zodiac;

/// Activation counts for one calendar day. Discarded when the day ends.
#[derive(Debug, Clone)]
pub struct DayState {
    pub date: NaiveDate,
    activations: ActiveSigns,
}

impl DayState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            activations: ActiveSigns::default(),
        }
    }

    /// Counts every performing row of a finished match.
    pub fn update_from_match(&mut self, rows: &[&EventRecord]) {
        for sign in rows.iter().filter_map(|r| r.performing_sign()) {
            self.activations.push(sign);
        }
    }

    pub fn activate(&mut self, sign: Zodiac) {
        self.activations.push(sign);
    }

    pub fn activation_count(&self, sign: Zodiac) -> u32 {
        self.activations.count(sign)
    }

    pub fn active_signs(&self) -> Vec<Zodiac> {
        self.activations.iter().map(|(s, _)| s).collect()
    }

    pub fn has_activations(&self) -> bool {
        !self.activations.is_empty()
    }

    /// The counts as a repeatable multiset, ready for the momentum predictor.
    pub fn activations(&self) -> &ActiveSigns {
        &self.activations
    }

    pub fn reset(&mut self) {
        self.activations = ActiveSigns::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_performers_with_known_sign() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 14).unwrap();
        let rows = [
            EventRecord::new("a", date, Some(Zodiac::Leo), true),
            EventRecord::new("b", date, Some(Zodiac::Leo), true),
            EventRecord::new("c", date, Some(Zodiac::Virgo), false),
            EventRecord::new("d", date, None, true),
        ];
        let refs = rows.iter().collect::<Vec<_>>();
        let mut state = DayState::new(date);
        state.update_from_match(&refs);
        assert_eq!(state.activation_count(Zodiac::Leo), 2);
        assert_eq!(state.activation_count(Zodiac::Virgo), 0);
        assert_eq!(state.active_signs(), vec![Zodiac::Leo]);
        assert_eq!(state.activations().total(), 2);

        state.reset();
        assert!(!state.has_activations());
    }
}
