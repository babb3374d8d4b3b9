//! Per-kind action handlers invoked by `Combat::process_action`.

use crate::messages::MessageKey;

use super::engine::Combat;
use super::error::CombatError;
use super::formula::{attack_damage, critical_chance, defend_bonus, flee_chance, hit_chance};
use super::status::apply_effect;
use super::types::{
    ActionKind, CombatAction, CombatActionResult, CombatState, EffectKind, StatModifiers,
    StatusEffect,
};

const DEFEND_DURATION: i32 = 1;

impl Combat {
    pub(super) fn dispatch(
        &mut self,
        action: &CombatAction,
    ) -> Result<CombatActionResult, CombatError> {
        match action.kind {
            ActionKind::Attack => self.resolve_attack(action),
            ActionKind::Defend => self.resolve_defend(action),
            ActionKind::UseSkill => Ok(self.unsupported(action, MessageKey::SkillUnsupported)),
            ActionKind::UseItem => Ok(self.unsupported(action, MessageKey::ItemUnsupported)),
            ActionKind::Flee => self.resolve_flee(action),
        }
    }

    fn actor_name(&self, action: &CombatAction) -> Result<String, CombatError> {
        self.combatant(&action.actor_id)
            .map(|actor| actor.name.clone())
            .ok_or_else(|| CombatError::UnknownActor(action.actor_id.clone()))
    }

    fn resolve_attack(&mut self, action: &CombatAction) -> Result<CombatActionResult, CombatError> {
        let target_id = action
            .target_id
            .as_ref()
            .ok_or_else(|| CombatError::MissingTarget(action.actor_id.clone()))?;
        let (attacker_name, attack, critical_rate) = self
            .combatant(&action.actor_id)
            .map(|actor| (actor.name.clone(), actor.attack, actor.critical_rate))
            .ok_or_else(|| CombatError::UnknownActor(action.actor_id.clone()))?;
        let target = self
            .combatant(target_id)
            .ok_or_else(|| CombatError::UnknownTarget(target_id.clone()))?;
        if !target.is_alive() {
            return Err(CombatError::TargetDefeated(target_id.clone()));
        }
        let (target_name, defense, evasion) = (target.name.clone(), target.defense, target.evasion);

        if !self.rng.chance(hit_chance(evasion)) {
            let message =
                self.catalog.render(MessageKey::AttackMissed, &[("attacker", &attacker_name)]);
            let mut result = CombatActionResult::new(action.clone(), true, message);
            result.is_miss = true;
            return Ok(result);
        }

        let is_critical = self.rng.chance(critical_chance(critical_rate));
        let variance_roll = self.rng.next_f64();
        let damage = attack_damage(attack, defense, variance_roll, is_critical);
        if let Some(target) = self.combatant_mut(target_id) {
            target.take_damage(damage);
        }

        let key = if is_critical { MessageKey::AttackCritical } else { MessageKey::AttackHit };
        let damage_text = damage.to_string();
        let message = self.catalog.render(
            key,
            &[("attacker", &attacker_name), ("target", &target_name), ("damage", &damage_text)],
        );
        let mut result = CombatActionResult::new(action.clone(), true, message);
        result.damage = Some(damage);
        result.is_critical = is_critical;
        Ok(result)
    }

    fn resolve_defend(&mut self, action: &CombatAction) -> Result<CombatActionResult, CombatError> {
        let turn_number = self.turns().len() + 1;
        let effect_name = self.catalog.render(MessageKey::DefendEffectName, &[]);
        let actor = self
            .combatant_mut(&action.actor_id)
            .ok_or_else(|| CombatError::UnknownActor(action.actor_id.clone()))?;

        let amount = defend_bonus(actor.defense);
        let effect = StatusEffect {
            id: format!("defend-{turn_number}"),
            name: effect_name,
            kind: EffectKind::Buff,
            duration: DEFEND_DURATION,
            modifiers: StatModifiers { defense: amount, ..StatModifiers::default() },
        };
        let applied = apply_effect(actor, effect).clone();
        let actor_name = actor.name.clone();

        let amount_text = applied.modifiers.defense.to_string();
        let message = self
            .catalog
            .render(MessageKey::Defend, &[("actor", &actor_name), ("amount", &amount_text)]);
        let mut result = CombatActionResult::new(action.clone(), true, message);
        result.status_effect_applied = Some(applied);
        Ok(result)
    }

    fn resolve_flee(&mut self, action: &CombatAction) -> Result<CombatActionResult, CombatError> {
        if action.actor_id != self.player.id {
            return Err(CombatError::FleeByEnemy(action.actor_id.clone()));
        }
        let actor_name = self.actor_name(action)?;
        let enemy_speeds: Vec<i32> = self.enemies.iter().map(|enemy| enemy.speed).collect();
        let escape_chance = flee_chance(self.player.speed, &enemy_speeds);

        if self.rng.chance(escape_chance) {
            self.state = CombatState::Fled;
            let message = self.catalog.render(MessageKey::Fled, &[("actor", &actor_name)]);
            return Ok(CombatActionResult::new(action.clone(), true, message));
        }
        let message = self.catalog.render(MessageKey::FleeFailed, &[("actor", &actor_name)]);
        Ok(CombatActionResult::new(action.clone(), false, message))
    }

    fn unsupported(&self, action: &CombatAction, key: MessageKey) -> CombatActionResult {
        let actor_name = self.actor_name(action).unwrap_or_else(|_| action.actor_id.to_string());
        let message = self.catalog.render(key, &[("actor", &actor_name)]);
        CombatActionResult::new(action.clone(), false, message)
    }
}
