use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Default)]
struct Slot {
    held: bool,
    waiters: VecDeque<oneshot::Sender<()>>,
}

#[derive(Clone, Default)]
pub struct LockManager {
    slots: Arc<DashMap<String, Slot>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> Permit {
        let rx = {
            let mut slot = self.slots.entry(key.to_string()).or_default();
            if slot.held {
                let (tx, rx) = oneshot::channel();
                slot.waiters.push_back(tx);
                Some(rx)
            } else {
                slot.held = true;
                None
            }
        };

        if let Some(rx) = rx {
            let mut waiting = Waiting {
                rx: Some(rx),
                slots: &*self.slots,
                key,
            };
            waiting.granted().await;
        }

        Permit {
            slots: Arc::clone(&self.slots),
            key: key.to_string(),
        }
    }

    pub fn release(&self, permit: Permit) {
        drop(permit);
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.slots.get(key).map(|slot| slot.held).unwrap_or(false)
    }

    pub fn waiting(&self, key: &str) -> usize {
        self.slots.get(key).map(|slot| slot.waiters.len()).unwrap_or(0)
    }

    pub fn tracked_keys(&self) -> usize {
        self.slots.len()
    }
}

fn hand_off(slots: &DashMap<String, Slot>, key: &str) {
    let became_free = match slots.get_mut(key) {
        Some(mut slot) => {
            let mut handed = false;
            while let Some(tx) = slot.waiters.pop_front() {
                if tx.send(()).is_ok() {
                    handed = true;
                    break;
                }
            }
            if !handed {
                slot.held = false;
            }
            !handed
        }
        None => {
            log::warn!("Release for untracked lock key={}", key);
            false
        }
    };

    if became_free {
        slots.remove_if(key, |_, slot| !slot.held && slot.waiters.is_empty());
    }
}

// A waiter dropped after the grant was sent passes the key on.
struct Waiting<'a> {
    rx: Option<oneshot::Receiver<()>>,
    slots: &'a DashMap<String, Slot>,
    key: &'a str,
}

impl Waiting<'_> {
    async fn granted(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            // The sender is only dropped without sending when the whole
            // manager is gone, so either way we now own the key.
            let _ = rx.await;
        }
        self.rx = None;
    }
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            if rx.try_recv().is_ok() {
                hand_off(self.slots, self.key);
            }
        }
    }
}

pub struct Permit {
    slots: Arc<DashMap<String, Slot>>,
    key: String,
}

impl Permit {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        hand_off(&self.slots, &self.key);
    }
}

impl std::fmt::Debug for Permit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Permit").field("key", &self.key).finish()
    }
}
