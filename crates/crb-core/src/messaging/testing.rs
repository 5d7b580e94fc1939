use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, Destination, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Behaviour {
    Deliver,
    Fail,
    Hang,
}

/// Messenger double that records every send and can be told to fail or hang
/// for one particular destination.
pub(crate) struct RecordingMessenger {
    sent: Mutex<Vec<(Destination, String)>>,
    target: Destination,
    behaviour: Behaviour,
}

impl RecordingMessenger {
    pub(crate) fn new(target: Destination, behaviour: Behaviour) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            target,
            behaviour,
        }
    }

    pub(crate) fn sent(&self) -> Vec<(Destination, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn sent_to(&self, to: &Destination) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(d, _)| d == to)
            .map(|(_, t)| t)
            .collect()
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_text(&self, to: &Destination, text: &str) -> Result<MessageRef> {
        if *to == self.target {
            match self.behaviour {
                Behaviour::Deliver => {}
                Behaviour::Fail => {
                    return Err(Error::Delivery("chat not found".to_string()));
                }
                Behaviour::Hang => std::future::pending::<()>().await,
            }
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push((to.clone(), text.to_string()));
        let chat_id = match to {
            Destination::Chat(id) => *id,
            Destination::Username(_) => ChatId(-1),
        };
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.len() as i32),
        })
    }
}
