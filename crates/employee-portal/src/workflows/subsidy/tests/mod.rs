mod common;
mod entitlement;
mod installments;
