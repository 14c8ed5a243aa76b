mod emeh;
mod golden_trace;
mod legacy_escalation;
mod lifecycle;
mod weight_exceptions;
