//! Visitor dispatch over decoded BMP messages.
//!
//! Implement [`BmpMessageVisitor`] and override the methods for the message
//! kinds of interest; every method has a no-op default. [`BmpMessage::accept`]
//! calls exactly one method per message.

use crate::parser::bmp::messages::{
    InitiationMessage, PeerDownNotification, PeerUpNotification, RouteMirroring, RouteMonitoring,
    StatsReport, TerminationMessage,
};
use crate::parser::bmp::{BmpMessage, MessageBody};

/// One callback per BMP message kind.
///
/// Each method receives the whole [`BmpMessage`] alongside the typed body, so
/// implementations can reach the common header, the per-peer header, and any
/// resolved peer info without downcasting.
#[allow(unused_variables)]
pub trait BmpMessageVisitor {
    fn visit_route_monitoring(&mut self, message: &BmpMessage, body: &RouteMonitoring) {}

    fn visit_stats_report(&mut self, message: &BmpMessage, body: &StatsReport) {}

    fn visit_peer_down(&mut self, message: &BmpMessage, body: &PeerDownNotification) {}

    fn visit_peer_up(&mut self, message: &BmpMessage, body: &PeerUpNotification) {}

    fn visit_initiation(&mut self, message: &BmpMessage, body: &InitiationMessage) {}

    fn visit_termination(&mut self, message: &BmpMessage, body: &TerminationMessage) {}

    fn visit_route_mirroring(&mut self, message: &BmpMessage, body: &RouteMirroring) {}
}

impl BmpMessage {
    /// Dispatch this message to the visitor method matching its body.
    pub fn accept<V: BmpMessageVisitor + ?Sized>(&self, visitor: &mut V) {
        match &self.message_body {
            MessageBody::RouteMonitoring(body) => visitor.visit_route_monitoring(self, body),
            MessageBody::StatsReport(body) => visitor.visit_stats_report(self, body),
            MessageBody::PeerDownNotification(body) => visitor.visit_peer_down(self, body),
            MessageBody::PeerUpNotification(body) => visitor.visit_peer_up(self, body),
            MessageBody::InitiationMessage(body) => visitor.visit_initiation(self, body),
            MessageBody::TerminationMessage(body) => visitor.visit_termination(self, body),
            MessageBody::RouteMirroring(body) => visitor.visit_route_mirroring(self, body),
        }
    }
}
