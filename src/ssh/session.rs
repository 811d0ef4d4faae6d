// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::ssh::transport::{TransferChannel, Transport};

/// A live session: primary transport, its transfer sub-channel, and the jump
/// transport it may be tunneled through.
pub struct Session {
    pub primary: Box<dyn Transport>,
    pub transfer: Box<dyn TransferChannel>,
    pub jump: Option<Box<dyn Transport>>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.primary.is_active()
    }

    /// Release every handle, innermost first. Never fails.
    pub async fn teardown(self) {
        self.transfer.close().await;
        self.primary.disconnect().await;
        if let Some(jump) = self.jump {
            jump.disconnect().await;
        }
    }
}

/// Holder for at most one [`Session`].
///
/// The slot only changes through [`SessionSlot::replace`] and
/// [`SessionSlot::take`], so callers never see a half-replaced session.
#[derive(Default)]
pub struct SessionSlot {
    current: Option<Session>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Tear down the current session, if any, then install `session`.
    pub async fn replace(&mut self, session: Session) {
        if let Some(old) = self.current.take() {
            old.teardown().await;
        }
        self.current = Some(session);
    }

    /// Remove the current session without tearing it down.
    pub fn take(&mut self) -> Option<Session> {
        self.current.take()
    }
}
