use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use battle_core::{CombatantId, WorldPosition};

use crate::action::{ActionComponent, ComponentKind, ExecutionContext};
use crate::api::Result;

/// Walks the owner up to its targets before the strike and back afterwards.
#[derive(Debug)]
pub struct MovementComponent {
    owner: CombatantId,
    home: Mutex<Option<WorldPosition>>,
}

impl MovementComponent {
    pub fn new(owner: CombatantId) -> Self {
        Self {
            owner,
            home: Mutex::new(None),
        }
    }

    fn set_home(&self, home: Option<WorldPosition>) {
        *self.home.lock().unwrap_or_else(PoisonError::into_inner) = home;
    }

    fn take_home(&self) -> Option<WorldPosition> {
        self.home
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl ActionComponent for MovementComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Movement
    }

    async fn before_execute(&self, ctx: &ExecutionContext) -> Result<()> {
        let world = ctx.session.world();
        self.set_home(world.position_of(self.owner));

        let destination = WorldPosition::centroid(
            ctx.action
                .locked_targets()
                .into_iter()
                .filter_map(|target| world.position_of(target)),
        );
        if let Some(destination) = destination {
            world.move_actor(self.owner, destination).await;
        }
        Ok(())
    }

    async fn after_executed(&self, ctx: &ExecutionContext) -> Result<()> {
        if let Some(home) = self.take_home() {
            ctx.session.world().move_actor(self.owner, home).await;
        }
        Ok(())
    }
}
