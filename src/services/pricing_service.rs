//! Calculador de precios
//!
//! Dos fórmulas independientes, una por cada punto de entrada:
//!
//! - formulario: `base_price × cantidad + precio_hora_adicional × horas_adicionales × cantidad`
//! - carrito: `Σ(precio_hora × cantidad × horas_uso)` más GST plano
//!
//! Las líneas cuya categoría KVA no está en el catálogo se descartan sin error.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use crate::dto::pricing_dto::{
    BookingEstimate, CartCheckout, CartItemRequest, EstimateLineRequest, Totals,
};
use crate::models::booking::GeneratorLine;
use crate::models::generator::Generator;

/// Catálogo indexado por categoría KVA
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    entries: HashMap<String, Generator>,
}

impl PriceCatalog {
    pub fn new(generators: Vec<Generator>) -> Self {
        let entries = generators
            .into_iter()
            .map(|g| (g.kva.trim().to_string(), g))
            .collect();
        Self { entries }
    }

    pub fn get(&self, kva_category: &str) -> Option<&Generator> {
        self.entries.get(kva_category.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct PricingService;

impl PricingService {
    /// Precio de una línea del formulario
    pub fn price_form_line(line: &EstimateLineRequest, entry: &Generator) -> GeneratorLine {
        let quantity = Decimal::from(line.quantity);
        let additional_hours = Decimal::from(line.additional_hours);

        let base_cost = entry.base_price * quantity;
        let additional_cost = entry.price_per_additional_hour * additional_hours * quantity;

        GeneratorLine {
            kva_category: entry.kva.clone(),
            quantity: line.quantity,
            additional_hours: line.additional_hours,
            usage_hours: None,
            base_cost,
            additional_cost,
            total: base_cost + additional_cost,
            status: None,
            timers: Vec::new(),
        }
    }

    /// Estimación del formulario de reserva (sin impuestos)
    pub fn estimate_booking(lines: &[EstimateLineRequest], catalog: &PriceCatalog) -> BookingEstimate {
        let priced: Vec<GeneratorLine> = lines
            .iter()
            .filter_map(|line| match catalog.get(&line.kva_category) {
                Some(entry) => Some(Self::price_form_line(line, entry)),
                None => {
                    debug!("Categoría KVA desconocida ignorada: {}", line.kva_category);
                    None
                }
            })
            .collect();

        let grand_total = priced.iter().map(|l| l.total).sum();

        BookingEstimate {
            lines: priced,
            grand_total,
        }
    }

    /// Checkout del carrito con GST plano sobre el subtotal
    pub fn checkout_cart(
        items: &[CartItemRequest],
        catalog: &PriceCatalog,
        gst_rate: Decimal,
    ) -> CartCheckout {
        let lines: Vec<GeneratorLine> = items
            .iter()
            .filter_map(|item| {
                let entry = catalog.get(&item.kva_category)?;
                let cost = entry.price_per_hour
                    * Decimal::from(item.quantity)
                    * Decimal::from(item.usage_hours);
                Some(GeneratorLine {
                    kva_category: entry.kva.clone(),
                    quantity: item.quantity,
                    additional_hours: 0,
                    usage_hours: Some(item.usage_hours),
                    base_cost: cost,
                    additional_cost: Decimal::ZERO,
                    total: cost,
                    status: None,
                    timers: Vec::new(),
                })
            })
            .collect();

        let subtotal: Decimal = lines.iter().map(|l| l.total).sum();
        let totals = Self::apply_tax(subtotal, gst_rate);

        CartCheckout {
            lines,
            subtotal: totals.subtotal,
            gst: totals.tax,
            total: totals.total,
        }
    }

    /// Aplicar el impuesto a un subtotal, redondeado a 2 decimales
    pub fn apply_tax(subtotal: Decimal, rate: Decimal) -> Totals {
        let tax = (subtotal * rate).round_dp(2);
        Totals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}
