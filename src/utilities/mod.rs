/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
mod flag;
mod retry;
mod timeout;

pub(crate) use flag::CancelFlag;
pub(crate) use retry::attempt;
pub(crate) use timeout::Timeout;
