// src/services/receipt_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::pos::{OrderDetail, OrderStatus},
};

pub const FONT_FAMILY: &str = "Roboto";

pub fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

// Uma linha impressa: produto, qtd, unitário, subtotal
pub fn receipt_rows(detail: &OrderDetail) -> Vec<[String; 4]> {
    detail
        .items
        .iter()
        .map(|line| {
            [
                line.product_name.clone(),
                line.item.quantity.to_string(),
                money(line.item.unit_price),
                money(line.item.subtotal),
            ]
        })
        .collect()
}

fn render_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

#[derive(Clone)]
pub struct ReceiptService {
    fonts_dir: PathBuf,
}

impl ReceiptService {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self { fonts_dir: fonts_dir.into() }
    }

    /// Recibo em PDF de um pedido concluído, com QR code do ID do pedido.
    pub fn render(&self, club_name: &str, detail: &OrderDetail) -> Result<Vec<u8>, AppError> {
        if detail.order.status != OrderStatus::Completed {
            return Err(AppError::BadRequest("Só pedidos concluídos têm recibo.".into()));
        }

        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None)
            .map_err(|_| AppError::FontNotFound(format!("{} em {}", FONT_FAMILY, self.fonts_dir.display())))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Recibo {}", detail.order.id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(elements::Paragraph::new(club_name).styled(style::Style::new().bold().with_font_size(18)));
        doc.push(elements::Break::new(1.5));
        doc.push(
            elements::Paragraph::new(format!("MESA {}", detail.table_number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        let closed_at = detail.order.closed_at.unwrap_or(detail.order.updated_at);
        doc.push(elements::Paragraph::new(format!(
            "Aberto: {}  Fechado: {}",
            detail.order.opened_at.format("%d/%m/%Y %H:%M"),
            closed_at.format("%d/%m/%Y %H:%M")
        )));
        doc.push(elements::Break::new(2));

        // --- ITENS ---
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Produto").styled(bold))
            .element(elements::Paragraph::new("Qtd").styled(bold))
            .element(elements::Paragraph::new("Unitário").styled(bold))
            .element(elements::Paragraph::new("Subtotal").styled(bold))
            .push()
            .map_err(render_error)?;

        for [name, qty, unit, subtotal] in receipt_rows(detail) {
            table
                .row()
                .element(elements::Paragraph::new(name))
                .element(elements::Paragraph::new(qty))
                .element(elements::Paragraph::new(unit))
                .element(elements::Paragraph::new(subtotal))
                .push()
                .map_err(render_error)?;
        }
        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAL ---
        let mut total = elements::Paragraph::new(format!("TOTAL: {}", money(detail.order.total)));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(12)));
        doc.push(elements::Break::new(2));

        // --- QR (ID do pedido, para conferência na saída) ---
        let code = QrCode::new(detail.order.id.to_string().as_bytes()).map_err(render_error)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let qr = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(image_buffer))
            .map_err(render_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(qr);

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(render_error)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pos::{Order, OrderItem, OrderItemDetail};
    use chrono::Utc;
    use uuid::Uuid;

    fn detail(status: OrderStatus) -> OrderDetail {
        let order_id = Uuid::new_v4();
        let item = OrderItem {
            id: Uuid::new_v4(),
            club_id: Uuid::nil(),
            order_id,
            product_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: Decimal::new(1250, 2),
            subtotal: Decimal::new(3750, 2),
            created_at: Utc::now(),
        };
        OrderDetail {
            order: Order {
                id: order_id,
                club_id: Uuid::nil(),
                table_id: Uuid::new_v4(),
                status,
                total: Decimal::new(3750, 2),
                opened_by: Uuid::new_v4(),
                opened_at: Utc::now(),
                closed_at: None,
                updated_at: Utc::now(),
            },
            table_number: 7,
            items: vec![OrderItemDetail { item, product_name: "Chope".into() }],
        }
    }

    #[test]
    fn rows_show_quantity_and_two_decimal_prices() {
        let rows = receipt_rows(&detail(OrderStatus::Completed));
        assert_eq!(rows, vec![["Chope".to_string(), "3".into(), "12.50".into(), "37.50".into()]]);
        assert_eq!(money(Decimal::new(5, 0)), "5.00");
    }

    #[test]
    fn open_orders_have_no_receipt() {
        let service = ReceiptService::new("./fonts");
        let err = service.render("Club", &detail(OrderStatus::Processing)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn missing_fonts_are_reported() {
        let service = ReceiptService::new("/nao/existe");
        let err = service.render("Club", &detail(OrderStatus::Completed)).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }
}
