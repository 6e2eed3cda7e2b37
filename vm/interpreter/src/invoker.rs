// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::Error;
use actor::{account, init, ACCOUNT_ACTOR_CODE_ID, INIT_ACTOR_CODE_ID};
use cid::Cid;
use ipld_blockstore::BlockStore;
use log::debug;
use runtime::InvocationContext;
use vm::{ActorState, InvocOutput, MethodNum, Serialized, METHOD_SEND};
use std::collections::HashMap;

/// Signature of a registered actor method: the callee's header record, the
/// execution context, and the encoded parameters.
pub type MethodFn<BS> = fn(
    &ActorState,
    &mut dyn InvocationContext<BS>,
    &Serialized,
) -> Result<InvocOutput, vm::ActorError>;

/// Registry resolving `(actor code, method number)` to a concrete method
/// implementation. Populated at VM construction and read-only afterwards.
pub struct Invoker<BS> {
    methods: HashMap<(Cid, MethodNum), MethodFn<BS>>,
}

impl<BS> Invoker<BS>
where
    BS: BlockStore,
{
    /// Constructs a registry preloaded with the builtin actors.
    pub fn new() -> Self {
        let mut inv = Invoker {
            methods: HashMap::new(),
        };
        inv.register(
            *ACCOUNT_ACTOR_CODE_ID,
            account::Method::Constructor as MethodNum,
            account::constructor,
        );
        inv.register(
            *INIT_ACTOR_CODE_ID,
            init::Method::Constructor as MethodNum,
            init::constructor,
        );
        inv.register(*INIT_ACTOR_CODE_ID, init::Method::Exec as MethodNum, init::exec);
        inv
    }

    /// Registers a method implementation for an actor code.
    pub fn register(&mut self, code: Cid, method: MethodNum, method_fn: MethodFn<BS>) {
        self.methods.insert((code, method), method_fn);
    }

    /// Resolves and calls the method implementation for the actor. A missing
    /// registration is a hard error; a non-fatal actor failure is folded into
    /// the returned output's exit code.
    pub fn invoke(
        &self,
        act: &ActorState,
        ctx: &mut dyn InvocationContext<BS>,
        method: MethodNum,
        params: &Serialized,
    ) -> Result<InvocOutput, Error> {
        // Method zero is the pure transfer sentinel; the pipeline
        // short-circuits it before dispatch ever happens.
        if method == METHOD_SEND {
            return Err(Error::InvokerMissing {
                code: act.code,
                method,
            });
        }

        let method_fn = self.methods.get(&(act.code, method)).ok_or(Error::InvokerMissing {
            code: act.code,
            method,
        })?;

        match method_fn(act, ctx, params) {
            Ok(out) => Ok(out),
            Err(e) if e.is_fatal() => Err(Error::Actor(e)),
            Err(e) => {
                debug!("[method={}] invocation error: {}", method, e.msg());
                Ok(InvocOutput {
                    exit_code: e.exit_code(),
                    return_data: Serialized::default(),
                })
            }
        }
    }
}

impl<BS: BlockStore> Default for Invoker<BS> {
    fn default() -> Self {
        Self::new()
    }
}
