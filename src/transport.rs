//! In-process transport plumbing.
//!
//! Requests issued by aggregators are queued on a channel; a responder
//! answers them and the answers are fed back through the dispatcher. The
//! HTTP client itself lives outside this crate; [`ScriptedServer`] stands in
//! for it when replaying recorded responses.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{channel, Receiver, Sender};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregator::{Target, Transport};
use crate::dispatch::{Delivery, Dispatcher};
use crate::payload::{HttpFailure, Link, ResponsePayload};

/// A request waiting for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub link: Link,
    pub target: Target,
}

/// [`Transport`] that only enqueues requests.
#[derive(Clone)]
pub struct ChannelTransport {
    sender: Sender<Request>,
}

impl ChannelTransport {
    pub fn new_pair() -> (Self, RequestQueue) {
        let (sender, receiver) = channel();
        (Self { sender }, RequestQueue { receiver })
    }
}

impl Transport for ChannelTransport {
    fn invoke(&self, link: &Link, target: Target) {
        let request = Request {
            link: link.clone(),
            target,
        };
        if let Err(e) = self.sender.send(request) {
            warn!(href = %e.0.link.href, "Request queue closed; dropping request");
        }
    }
}

pub struct RequestQueue {
    receiver: Receiver<Request>,
}

impl RequestQueue {
    pub fn drain(&self) -> Vec<Request> {
        let mut requests = Vec::new();
        while let Ok(request) = self.receiver.try_recv() {
            requests.push(request);
        }
        requests
    }
}

/// Order in which outstanding requests are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOrder {
    /// Oldest request first.
    #[default]
    Fifo,
    /// Newest request first.
    Lifo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedResponse {
    #[serde(default = "default_subtype")]
    pub subtype: String,
    pub payload: ResponsePayload,
}

fn default_subtype() -> String {
    "json".to_string()
}

/// Answers requests from a fixed table of responses keyed by href.
#[derive(Debug, Clone, Default)]
pub struct ScriptedServer {
    responses: HashMap<String, ScriptedResponse>,
}

impl ScriptedServer {
    pub fn new(responses: HashMap<String, ScriptedResponse>) -> Self {
        Self { responses }
    }

    pub fn insert(&mut self, href: impl Into<String>, response: ScriptedResponse) {
        self.responses.insert(href.into(), response);
    }

    /// Unknown hrefs answer with a 404 error payload.
    pub fn answer(&self, request: Request) -> Delivery {
        match self.responses.get(&request.link.href) {
            Some(response) => Delivery::new(
                request.target,
                response.payload.clone(),
                response.subtype.clone(),
            ),
            None => {
                debug!(href = %request.link.href, "No scripted response");
                let failure = HttpFailure {
                    url: request.link.href,
                    status: 404,
                    message: "no scripted response".to_string(),
                };
                Delivery::new(request.target, ResponsePayload::Error(failure), "json")
            }
        }
    }
}

/// Outcome of pumping an episode until its request queue went quiet.
#[derive(Debug, Clone, Default)]
pub struct PumpReport {
    pub delivered: usize,
    pub failures: Vec<String>,
    pub exhausted: bool,
}

/// Answer queued requests and feed the answers back until nothing is
/// outstanding or `max_deliveries` is reached.
pub fn pump(
    dispatcher: &mut Dispatcher,
    queue: &RequestQueue,
    server: &ScriptedServer,
    order: DeliveryOrder,
    max_deliveries: usize,
) -> PumpReport {
    let mut report = PumpReport::default();
    let mut pending: VecDeque<Request> = queue.drain().into();
    loop {
        let next = match order {
            DeliveryOrder::Fifo => pending.pop_front(),
            DeliveryOrder::Lifo => pending.pop_back(),
        };
        let Some(request) = next else {
            break;
        };
        if report.delivered >= max_deliveries {
            warn!(max_deliveries, "Delivery limit reached; abandoning pump");
            report.exhausted = true;
            break;
        }
        let delivery = server.answer(request);
        if let Err(e) = dispatcher.deliver(delivery) {
            warn!(error = %e, "Update failed");
            report.failures.push(e.to_string());
        }
        report.delivered += 1;
        pending.extend(queue.drain());
    }
    report
}
