//! The lifecycle controller — construction and destruction sequences.
//!
//! Construction: around-construct chain wrapping the construct glue,
//! then injection, then the post-construct chain. Only a fully built
//! instance is ever returned; on failure at any step the partial
//! work is released and nothing becomes observable.
//!
//! Destruction: pre-destroy chain, then recursive release of the
//! instance's dependent objects (reverse creation order), then the
//! caller removes the handle from whatever store held it.

use crate::{Container, ContainerError};
use serde_json::Value;
use std::sync::Arc;
use trellis_context::{ContextInstanceHandle, CreationalContext};
use trellis_intercept::{InterceptError, TerminalFn};
use trellis_metadata::InterceptionPhase;
use trellis_types::BeanId;

impl Container {
    /// Builds a fully initialized instance of `bean`.
    ///
    /// The returned handle is not yet published anywhere; the caller
    /// decides the owner (a context store, a creational context, or a
    /// direct dependent handle).
    pub(crate) fn build_bean(
        &self,
        bean: &BeanId,
    ) -> Result<ContextInstanceHandle, ContainerError> {
        let creational = CreationalContext::new();
        match self.build_under(bean, &creational) {
            Ok(instance) => Ok(ContextInstanceHandle::new(
                bean.clone(),
                instance,
                creational,
            )),
            Err(err) => {
                // Dependents created before the failure must not leak.
                self.release_dependents(&creational);
                Err(err)
            }
        }
    }

    fn build_under(
        &self,
        bean: &BeanId,
        creational: &CreationalContext,
    ) -> Result<trellis_types::InstanceRef, ContainerError> {
        let strategy = self.strategy(bean)?.clone();
        tracing::debug!(bean = %bean, "constructing instance");

        // Around-construct wraps the actual construction only. The
        // terminal parks the new instance on the context target.
        let construct = strategy.construct;
        let container = self.clone();
        let construct_creational = creational.clone();
        let terminal: TerminalFn = Arc::new(move |ctx| {
            let instance = (construct)(&container, &construct_creational)?;
            ctx.target = Some(instance);
            Ok(Value::Null)
        });
        let chain = self.chain(bean, None, InterceptionPhase::AroundConstruct);
        let mut ctx = chain.invocation(InterceptionPhase::AroundConstruct, bean.clone(), terminal);
        ctx.proceed()?;
        let instance = ctx
            .target
            .take()
            .ok_or_else(|| InterceptError::MissingTarget {
                phase: InterceptionPhase::AroundConstruct.as_str().to_string(),
            })?;

        // Injection of pre-resolved dependencies.
        if let Some(inject) = &strategy.inject {
            inject(self, &instance, creational)?;
        }

        // Post-construct chain; terminal is the bean's own callback.
        let callback = strategy.post_construct;
        let callback_instance = instance.clone();
        let terminal: TerminalFn = Arc::new(move |_ctx| {
            if let Some(callback) = &callback {
                callback(&callback_instance)?;
            }
            Ok(Value::Null)
        });
        let chain = self.chain(bean, None, InterceptionPhase::PostConstruct);
        let mut ctx = chain
            .invocation(InterceptionPhase::PostConstruct, bean.clone(), terminal)
            .with_target(instance.clone());
        ctx.proceed()?;

        Ok(instance)
    }

    /// Runs the destruction sequence for a stored instance: the
    /// pre-destroy chain, then recursive release of its dependents.
    ///
    /// Dependent-release failures are logged and do not interrupt the
    /// release of siblings; a pre-destroy chain failure is returned
    /// after dependents have been released.
    pub(crate) fn destroy_bean(
        &self,
        handle: &ContextInstanceHandle,
    ) -> Result<(), ContainerError> {
        let bean = handle.bean();
        let strategy = self.strategy(bean)?.clone();
        tracing::debug!(bean = %bean, "destroying instance");

        let callback = strategy.pre_destroy;
        let callback_instance = handle.instance().clone();
        let terminal: TerminalFn = Arc::new(move |_ctx| {
            if let Some(callback) = &callback {
                callback(&callback_instance)?;
            }
            Ok(Value::Null)
        });
        let chain = self.chain(bean, None, InterceptionPhase::PreDestroy);
        let mut ctx = chain
            .invocation(InterceptionPhase::PreDestroy, bean.clone(), terminal)
            .with_target(handle.instance().clone());
        let result = ctx.proceed();

        // Dependents go with their owner even when the owner's chain
        // failed.
        self.release_dependents(handle.creational());

        result.map(|_| ()).map_err(Into::into)
    }

    /// Destroys every dependent tracked by `creational`, most
    /// recently created first, recursing into each dependent's own
    /// creational context.
    pub(crate) fn release_dependents(&self, creational: &CreationalContext) {
        for record in creational.drain() {
            let dependent = ContextInstanceHandle::new(
                record.bean.clone(),
                record.instance,
                record.creational,
            );
            if let Err(err) = self.destroy_bean(&dependent) {
                tracing::warn!(
                    bean = %record.bean,
                    error = %err,
                    "dependent release failed"
                );
            }
        }
    }
}
